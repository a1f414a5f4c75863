//! Rate tables
//!
//! A [`RateTable`] is one underwriter's published pricing for one product,
//! effective from a given date. Tables are immutable once built; a revised
//! tariff is derived with [`RateTable::revise`], which yields a builder for a
//! new version and leaves the original untouched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Rate};

use crate::coverage::{ProductCode, UnderwriterId};
use crate::error::ConfigurationError;
use crate::factors::BracketTable;
use crate::vehicle::{UsageType, VehicleCategory};

/// How the base premium is derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseRate {
    /// A percentage of the declared vehicle value
    PercentOfValue { rate: Rate },
    /// A percentage of the declared value that depends on vehicle age. Each
    /// bracket's factor is the rate as a decimal fraction.
    PercentOfValueByAge { rates: BracketTable },
    /// A flat annual amount, independent of value
    Flat { amount: Decimal },
}

/// A percentage excess with optional floor and cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageExcess {
    pub percentage: Rate,
    pub minimum: Option<Decimal>,
    pub maximum: Option<Decimal>,
}

impl PercentageExcess {
    pub fn new(percentage: Rate, minimum: Option<Decimal>, maximum: Option<Decimal>) -> Self {
        Self {
            percentage,
            minimum,
            maximum,
        }
    }

    /// The unrounded excess on `declared_value`, clamped to the floor and cap
    pub fn amount_for(&self, declared_value: Decimal) -> Decimal {
        let mut amount = self.percentage.apply(declared_value);
        if let Some(min) = self.minimum {
            amount = amount.max(min);
        }
        if let Some(max) = self.maximum {
            amount = amount.min(max);
        }
        amount
    }
}

/// Additional flat excess for inexperienced drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungDriverExcess {
    pub amount: Decimal,
    /// Drivers younger than this age attract the excess
    pub under_age: u32,
    /// Drivers licensed for fewer years than this attract the excess
    pub min_years_licensed: Option<u32>,
}

/// Per-peril excess structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcessStructure {
    pub own_damage: Option<PercentageExcess>,
    pub theft: Option<PercentageExcess>,
    pub third_party_property: Option<Decimal>,
    pub windscreen: Option<Decimal>,
    pub young_driver: Option<YoungDriverExcess>,
}

/// Statutory charges added on top of the basic premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryLevies {
    pub training_levy: Rate,
    /// Policyholders compensation fund levy
    pub pcf_levy: Rate,
    /// Fixed stamp duty per policy
    pub stamp_duty: Decimal,
}

impl StatutoryLevies {
    /// Kenyan levies: 0.2% training levy, 0.25% PCF levy, KSh 40 stamp duty
    pub fn kenya() -> Self {
        Self {
            training_levy: Rate::from_percentage(dec!(0.2)),
            pcf_levy: Rate::from_percentage(dec!(0.25)),
            stamp_duty: dec!(40),
        }
    }
}

/// Multiplicative factor tables, applied in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorTables {
    pub vehicle_age: Option<BracketTable>,
    pub engine_capacity: Option<BracketTable>,
    /// Empty means usage is not a rating dimension for this table
    pub usage: BTreeMap<UsageType, Decimal>,
    pub driver_age: Option<BracketTable>,
    pub duration: Option<BracketTable>,
}

/// Loadings for claims and modification history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLoadings {
    pub prior_claims: Decimal,
    pub modifications: Decimal,
}

impl Default for HistoryLoadings {
    fn default() -> Self {
        Self {
            prior_claims: dec!(1.4),
            modifications: dec!(1.15),
        }
    }
}

/// Limits outside which the underwriter declines to quote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceLimits {
    pub max_vehicle_age: Option<u32>,
    pub minimum_sum_insured: Option<Decimal>,
}

/// One underwriter's tariff for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    underwriter: UnderwriterId,
    underwriter_name: String,
    product: ProductCode,
    effective_from: NaiveDate,
    currency: Currency,
    base_rate: BaseRate,
    minimum_premium: Decimal,
    acceptance: AcceptanceLimits,
    excess: ExcessStructure,
    levies: StatutoryLevies,
    factors: FactorTables,
    category_loadings: BTreeMap<VehicleCategory, Decimal>,
    history_loadings: HistoryLoadings,
}

impl RateTable {
    /// Starts a new table
    pub fn builder(
        underwriter: impl Into<UnderwriterId>,
        underwriter_name: impl Into<String>,
        product: ProductCode,
        effective_from: NaiveDate,
    ) -> RateTableBuilder {
        RateTableBuilder {
            table: RateTable {
                underwriter: underwriter.into(),
                underwriter_name: underwriter_name.into(),
                product,
                effective_from,
                currency: Currency::KES,
                base_rate: BaseRate::Flat { amount: Decimal::ZERO },
                minimum_premium: Decimal::ZERO,
                acceptance: AcceptanceLimits::default(),
                excess: ExcessStructure::default(),
                levies: StatutoryLevies::kenya(),
                factors: FactorTables::default(),
                category_loadings: BTreeMap::new(),
                history_loadings: HistoryLoadings::default(),
            },
        }
    }

    /// Derives a new version of this table effective from `effective_from`
    pub fn revise(&self, effective_from: NaiveDate) -> RateTableBuilder {
        let mut table = self.clone();
        table.effective_from = effective_from;
        RateTableBuilder { table }
    }

    pub fn underwriter(&self) -> &UnderwriterId {
        &self.underwriter
    }

    pub fn underwriter_name(&self) -> &str {
        &self.underwriter_name
    }

    pub fn product(&self) -> ProductCode {
        self.product
    }

    pub fn effective_from(&self) -> NaiveDate {
        self.effective_from
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn base_rate(&self) -> &BaseRate {
        &self.base_rate
    }

    pub fn minimum_premium(&self) -> Decimal {
        self.minimum_premium
    }

    pub fn acceptance(&self) -> &AcceptanceLimits {
        &self.acceptance
    }

    pub fn excess(&self) -> &ExcessStructure {
        &self.excess
    }

    pub fn levies(&self) -> &StatutoryLevies {
        &self.levies
    }

    pub fn factors(&self) -> &FactorTables {
        &self.factors
    }

    /// Loading for a vehicle category, if the table defines one
    pub fn category_loading(&self, category: VehicleCategory) -> Option<Decimal> {
        self.category_loadings.get(&category).copied()
    }

    pub fn history_loadings(&self) -> &HistoryLoadings {
        &self.history_loadings
    }
}

/// Builder for [`RateTable`]
#[derive(Debug, Clone)]
pub struct RateTableBuilder {
    table: RateTable,
}

impl RateTableBuilder {
    pub fn currency(mut self, currency: Currency) -> Self {
        self.table.currency = currency;
        self
    }

    pub fn base_rate(mut self, base_rate: BaseRate) -> Self {
        self.table.base_rate = base_rate;
        self
    }

    pub fn minimum_premium(mut self, amount: Decimal) -> Self {
        self.table.minimum_premium = amount;
        self
    }

    pub fn max_vehicle_age(mut self, years: u32) -> Self {
        self.table.acceptance.max_vehicle_age = Some(years);
        self
    }

    pub fn minimum_sum_insured(mut self, amount: Decimal) -> Self {
        self.table.acceptance.minimum_sum_insured = Some(amount);
        self
    }

    pub fn excess(mut self, excess: ExcessStructure) -> Self {
        self.table.excess = excess;
        self
    }

    pub fn levies(mut self, levies: StatutoryLevies) -> Self {
        self.table.levies = levies;
        self
    }

    pub fn vehicle_age_factors(mut self, table: BracketTable) -> Self {
        self.table.factors.vehicle_age = Some(table);
        self
    }

    pub fn engine_capacity_factors(mut self, table: BracketTable) -> Self {
        self.table.factors.engine_capacity = Some(table);
        self
    }

    pub fn driver_age_factors(mut self, table: BracketTable) -> Self {
        self.table.factors.driver_age = Some(table);
        self
    }

    pub fn duration_factors(mut self, table: BracketTable) -> Self {
        self.table.factors.duration = Some(table);
        self
    }

    pub fn usage_factor(mut self, usage: UsageType, multiplier: Decimal) -> Self {
        self.table.factors.usage.insert(usage, multiplier);
        self
    }

    pub fn category_loading(mut self, category: VehicleCategory, multiplier: Decimal) -> Self {
        self.table.category_loadings.insert(category, multiplier);
        self
    }

    pub fn history_loadings(mut self, loadings: HistoryLoadings) -> Self {
        self.table.history_loadings = loadings;
        self
    }

    /// Validates and freezes the table
    pub fn build(self) -> Result<RateTable, ConfigurationError> {
        let table = self.table;
        let invalid = |message: String| ConfigurationError::InvalidRateTable {
            underwriter: table.underwriter.clone(),
            product: table.product,
            message,
        };

        match &table.base_rate {
            BaseRate::PercentOfValue { rate } if rate.as_decimal() <= Decimal::ZERO => {
                return Err(invalid(format!("base rate {} must be positive", rate)));
            }
            BaseRate::Flat { amount } if *amount <= Decimal::ZERO => {
                return Err(invalid(format!("flat base {} must be positive", amount)));
            }
            _ => {}
        }

        if table.minimum_premium < Decimal::ZERO {
            return Err(invalid("minimum premium cannot be negative".to_string()));
        }

        for excess in [table.excess.own_damage, table.excess.theft].into_iter().flatten() {
            if let (Some(min), Some(max)) = (excess.minimum, excess.maximum) {
                if min > max {
                    return Err(invalid(format!("excess minimum {} exceeds maximum {}", min, max)));
                }
            }
        }

        let multipliers = table
            .factors
            .usage
            .values()
            .chain(table.category_loadings.values())
            .chain([&table.history_loadings.prior_claims, &table.history_loadings.modifications]);
        for multiplier in multipliers {
            if *multiplier <= Decimal::ZERO {
                return Err(invalid(format!("multiplier {} must be positive", multiplier)));
            }
        }

        Ok(table)
    }
}
