//! Embedded motor tariff catalog
//!
//! The published motor tariffs of the underwriters on the panel, effective
//! 1 January 2025. Total-own-risk tables rate on a percentage of value with
//! age, engine, usage, driver and duration factors. Comprehensive tables use
//! an age-banded base rate. Third-party tables rate on a flat base.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::Rate;

use crate::coverage::ProductCode;
use crate::error::ConfigurationError;
use crate::factors::{Bracket, BracketTable, FactorDimension};
use crate::rate_table::{BaseRate, ExcessStructure, PercentageExcess, RateTable, YoungDriverExcess};
use crate::registry::RateTableRegistry;
use crate::vehicle::{UsageType, VehicleCategory};

const YOUNG_DRIVER_AGE: u32 = 25;

/// Builds the registry holding every catalog table
pub fn motor_catalog() -> Result<RateTableRegistry, ConfigurationError> {
    RateTableRegistry::builder().with_tables(motor_tables()?).build()
}

/// Every catalog table, unfrozen
pub fn motor_tables() -> Result<Vec<RateTable>, ConfigurationError> {
    let effective = catalog_effective_from()?;
    let mut tables = Vec::new();

    for terms in TOR_TERMS {
        tables.push(tor_table(terms, effective)?);
    }
    for terms in COMPREHENSIVE_TERMS {
        tables.push(comprehensive_table(terms, effective)?);
    }
    for (id, name) in [("jubilee", "Jubilee Allianz"), ("madison", "Madison General Insurance")] {
        tables.push(third_party_table(id, name, effective)?);
    }

    Ok(tables)
}

pub fn catalog_effective_from() -> Result<NaiveDate, ConfigurationError> {
    ymd(2025, 1, 1)
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, ConfigurationError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ConfigurationError::InvalidEffectiveDate { year, month, day })
}

struct OwnDamage {
    percent: Decimal,
    minimum: Decimal,
    maximum: Decimal,
}

struct TorTerms {
    id: &'static str,
    name: &'static str,
    rate_percent: Decimal,
    minimum_premium: Decimal,
    max_vehicle_age: u32,
    own_damage: OwnDamage,
    young_driver_excess: Decimal,
}

const TOR_TERMS: [TorTerms; 5] = [
    TorTerms {
        id: "sanlam",
        name: "Sanlam General Insurance",
        rate_percent: dec!(0.15),
        minimum_premium: dec!(3000),
        max_vehicle_age: 15,
        own_damage: OwnDamage { percent: dec!(10), minimum: dec!(50000), maximum: dec!(200000) },
        young_driver_excess: dec!(10000),
    },
    TorTerms {
        id: "madison",
        name: "Madison General Insurance",
        rate_percent: dec!(0.12),
        minimum_premium: dec!(3200),
        max_vehicle_age: 20,
        own_damage: OwnDamage { percent: dec!(8), minimum: dec!(40000), maximum: dec!(180000) },
        young_driver_excess: dec!(8000),
    },
    TorTerms {
        id: "kal",
        name: "Kenya Alliance Insurance",
        rate_percent: dec!(0.16),
        minimum_premium: dec!(3500),
        max_vehicle_age: 18,
        own_damage: OwnDamage { percent: dec!(10), minimum: dec!(35000), maximum: dec!(160000) },
        young_driver_excess: dec!(7500),
    },
    TorTerms {
        id: "pacis",
        name: "Pacis Insurance",
        rate_percent: dec!(0.14),
        minimum_premium: dec!(3100),
        max_vehicle_age: 16,
        own_damage: OwnDamage { percent: dec!(9), minimum: dec!(30000), maximum: dec!(150000) },
        young_driver_excess: dec!(6500),
    },
    TorTerms {
        id: "ga",
        name: "GA Insurance",
        rate_percent: dec!(0.17),
        minimum_premium: dec!(3800),
        max_vehicle_age: 17,
        own_damage: OwnDamage { percent: dec!(8), minimum: dec!(38000), maximum: dec!(170000) },
        young_driver_excess: dec!(8200),
    },
];

struct ComprehensiveTerms {
    id: &'static str,
    name: &'static str,
    /// Base rate percent for vehicles up to five years old
    newer_rate_percent: Decimal,
    /// Base rate percent for vehicles six to fifteen years old
    older_rate_percent: Decimal,
    minimum_premium: Decimal,
    own_damage: OwnDamage,
}

const COMPREHENSIVE_TERMS: [ComprehensiveTerms; 4] = [
    ComprehensiveTerms {
        id: "kal",
        name: "Kenya Alliance Insurance",
        newer_rate_percent: dec!(3.0),
        older_rate_percent: dec!(3.5),
        minimum_premium: dec!(20000),
        own_damage: OwnDamage { percent: dec!(2.5), minimum: dec!(15000), maximum: dec!(100000) },
    },
    ComprehensiveTerms {
        id: "pacis",
        name: "Pacis Insurance",
        newer_rate_percent: dec!(3.4),
        older_rate_percent: dec!(4.0),
        minimum_premium: dec!(25000),
        own_damage: OwnDamage { percent: dec!(3), minimum: dec!(25000), maximum: dec!(150000) },
    },
    ComprehensiveTerms {
        id: "madison",
        name: "Madison General Insurance",
        newer_rate_percent: dec!(3.3),
        older_rate_percent: dec!(3.9),
        minimum_premium: dec!(23000),
        own_damage: OwnDamage { percent: dec!(3), minimum: dec!(20000), maximum: dec!(120000) },
    },
    ComprehensiveTerms {
        id: "sanlam",
        name: "Sanlam General Insurance",
        newer_rate_percent: dec!(4.0),
        older_rate_percent: dec!(4.5),
        minimum_premium: dec!(30000),
        own_damage: OwnDamage { percent: dec!(5), minimum: dec!(50000), maximum: dec!(250000) },
    },
];

fn tor_table(terms: TorTerms, effective: NaiveDate) -> Result<RateTable, ConfigurationError> {
    let excess = ExcessStructure {
        own_damage: Some(percentage_excess(&terms.own_damage)),
        theft: Some(PercentageExcess::new(Rate::from_percentage(dec!(20)), Some(dec!(50000)), None)),
        third_party_property: Some(dec!(15000)),
        windscreen: Some(dec!(5000)),
        young_driver: Some(YoungDriverExcess {
            amount: terms.young_driver_excess,
            under_age: YOUNG_DRIVER_AGE,
            min_years_licensed: None,
        }),
    };

    RateTable::builder(terms.id, terms.name, ProductCode::TotalOwnRisk, effective)
        .base_rate(BaseRate::PercentOfValue { rate: Rate::from_percentage(terms.rate_percent) })
        .minimum_premium(terms.minimum_premium)
        .max_vehicle_age(terms.max_vehicle_age)
        .excess(excess)
        .vehicle_age_factors(vehicle_age_factors()?)
        .engine_capacity_factors(engine_capacity_factors()?)
        .driver_age_factors(driver_age_factors(dec!(1.3))?)
        .duration_factors(duration_factors()?)
        .usage_factor(UsageType::Private, dec!(1.0))
        .usage_factor(UsageType::Business, dec!(1.2))
        .usage_factor(UsageType::RideHailing, dec!(1.4))
        .category_loading(VehicleCategory::Psv, dec!(1.5))
        .build()
}

fn comprehensive_table(terms: ComprehensiveTerms, effective: NaiveDate) -> Result<RateTable, ConfigurationError> {
    let rates = BracketTable::new(
        FactorDimension::BaseRate,
        vec![
            Bracket::new(0, 5, Rate::from_percentage(terms.newer_rate_percent).as_decimal(), "up to 5 years"),
            Bracket::new(6, 15, Rate::from_percentage(terms.older_rate_percent).as_decimal(), "6 to 15 years"),
        ],
    )?;

    let excess = ExcessStructure {
        own_damage: Some(percentage_excess(&terms.own_damage)),
        theft: Some(PercentageExcess::new(Rate::from_percentage(dec!(10)), Some(dec!(20000)), None)),
        young_driver: Some(YoungDriverExcess {
            amount: dec!(5000),
            under_age: YOUNG_DRIVER_AGE,
            min_years_licensed: Some(2),
        }),
        ..Default::default()
    };

    RateTable::builder(terms.id, terms.name, ProductCode::Comprehensive, effective)
        .base_rate(BaseRate::PercentOfValueByAge { rates })
        .minimum_premium(terms.minimum_premium)
        .minimum_sum_insured(dec!(500000))
        .max_vehicle_age(15)
        .excess(excess)
        .driver_age_factors(driver_age_factors(dec!(1.3))?)
        .duration_factors(duration_factors()?)
        .usage_factor(UsageType::Private, dec!(1.0))
        .usage_factor(UsageType::Business, dec!(1.1))
        .usage_factor(UsageType::RideHailing, dec!(1.3))
        .category_loading(VehicleCategory::Psv, dec!(1.5))
        .category_loading(VehicleCategory::Commercial, dec!(1.1))
        .build()
}

fn third_party_table(id: &str, name: &str, effective: NaiveDate) -> Result<RateTable, ConfigurationError> {
    RateTable::builder(id, name, ProductCode::ThirdParty, effective)
        .base_rate(BaseRate::Flat { amount: dec!(7500) })
        .minimum_premium(dec!(1000))
        .excess(ExcessStructure {
            third_party_property: Some(dec!(15000)),
            ..Default::default()
        })
        .duration_factors(duration_factors()?)
        .usage_factor(UsageType::Private, dec!(1.0))
        .usage_factor(UsageType::Business, dec!(1.2))
        .usage_factor(UsageType::RideHailing, dec!(1.4))
        .category_loading(VehicleCategory::Psv, dec!(1.5))
        .build()
}

fn percentage_excess(terms: &OwnDamage) -> PercentageExcess {
    PercentageExcess::new(
        Rate::from_percentage(terms.percent),
        Some(terms.minimum),
        Some(terms.maximum),
    )
}

fn vehicle_age_factors() -> Result<BracketTable, ConfigurationError> {
    BracketTable::new(
        FactorDimension::VehicleAge,
        vec![
            Bracket::new(0, 3, dec!(1.2), "0-3 years"),
            Bracket::new(4, 8, dec!(1.0), "4-8 years"),
            Bracket::new(9, 15, dec!(0.9), "9-15 years"),
            Bracket::new(16, 20, dec!(0.8), "16-20 years"),
        ],
    )
}

fn engine_capacity_factors() -> Result<BracketTable, ConfigurationError> {
    BracketTable::new(
        FactorDimension::EngineCapacity,
        vec![
            Bracket::new(0, 1000, dec!(0.9), "up to 1000cc"),
            Bracket::new(1001, 1800, dec!(1.0), "1001-1800cc"),
            Bracket::new(1801, 3000, dec!(1.15), "1801-3000cc"),
            Bracket::from(3001, dec!(1.3), "above 3000cc"),
        ],
    )
}

fn driver_age_factors(young_loading: Decimal) -> Result<BracketTable, ConfigurationError> {
    BracketTable::new(
        FactorDimension::DriverAge,
        vec![
            Bracket::new(18, 25, young_loading, "18-25"),
            Bracket::new(26, 65, dec!(1.0), "26-65"),
            Bracket::from(66, dec!(1.1), "66 and over"),
        ],
    )
}

fn duration_factors() -> Result<BracketTable, ConfigurationError> {
    BracketTable::new(
        FactorDimension::Duration,
        vec![
            Bracket::new(1, 1, dec!(0.15), "1 month"),
            Bracket::new(2, 3, dec!(0.35), "up to 3 months"),
            Bracket::new(4, 6, dec!(0.65), "up to 6 months"),
            Bracket::new(7, 12, dec!(1.0), "annual"),
        ],
    )
}
