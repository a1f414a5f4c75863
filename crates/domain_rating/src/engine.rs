//! Premium Rating Engine
//!
//! [`compute_premium`] is a pure function of a [`RatingRequest`] and a
//! [`RateTable`]. It performs no I/O, holds no state and never mutates the
//! table, so it is safe to call concurrently from any number of quotations.
//!
//! # Algorithm
//!
//! 1. Base premium: percentage of declared value, age-banded percentage, or flat
//! 2. Factor multipliers: vehicle age, engine capacity, usage, driver age, duration
//! 3. Vehicle category loading
//! 4. Claims-history and modification loadings
//! 5. Minimum premium floor, applied once after every multiplier
//! 6. Statutory levies on the floored premium
//! 7. Own-damage excess clamped to the table's floor and cap
//!
//! All arithmetic is unrounded `Decimal`. Each output component is rounded
//! once when the breakdown is assembled, and the totals are summed from the
//! rounded components.

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::breakdown::{AppliedFactor, PremiumBreakdown};
use crate::error::{ConfigurationError, RatingError, RatingInput};
use crate::factors::{Bracket, BracketTable, FactorDimension};
use crate::rate_table::{BaseRate, RateTable};
use crate::request::RatingRequest;

const MIN_DURATION_MONTHS: u32 = 1;
const MAX_DURATION_MONTHS: u32 = 12;

/// Prices `request` against `table`
///
/// # Errors
///
/// - `InvalidRequest` for missing or out-of-range inputs, naming the input
/// - `Configuration(TableMismatch)` if `table` belongs to a different
///   underwriter or product than the request selects
pub fn compute_premium(request: &RatingRequest, table: &RateTable) -> Result<PremiumBreakdown, RatingError> {
    let coverage = &request.coverage;
    if coverage.underwriter != *table.underwriter() || coverage.product != table.product() {
        return Err(ConfigurationError::TableMismatch {
            underwriter: table.underwriter().clone(),
            product: table.product(),
            requested: format!("{}/{}", coverage.underwriter, coverage.product),
        }
        .into());
    }

    let vehicle = &request.vehicle;
    let declared_value = vehicle.declared_value;
    let vehicle_age = validate(request, table)?;

    let mut premium = Adjusted::new(base_premium(table, declared_value, vehicle_age)?);

    let factors = table.factors();
    if let Some(brackets) = &factors.vehicle_age {
        premium.apply_bracket(lookup(brackets, vehicle_age, RatingInput::YearOfManufacture)?, brackets.dimension());
    }
    if let (Some(brackets), Some(cc)) = (&factors.engine_capacity, vehicle.engine_capacity_cc) {
        premium.apply_bracket(lookup(brackets, cc, RatingInput::EngineCapacity)?, brackets.dimension());
    }
    if !factors.usage.is_empty() {
        let multiplier = factors.usage.get(&vehicle.usage).copied().ok_or_else(|| {
            RatingError::invalid(
                RatingInput::UsageType,
                format!("{} does not cover {} use", table.underwriter_name(), vehicle.usage),
            )
        })?;
        premium.apply(FactorDimension::Usage, vehicle.usage.to_string(), multiplier);
    }
    if let (Some(brackets), Some(driver)) = (&factors.driver_age, &request.driver) {
        premium.apply_bracket(lookup(brackets, driver.age, RatingInput::DriverAge)?, brackets.dimension());
    }
    if let Some(brackets) = &factors.duration {
        premium.apply_bracket(lookup(brackets, coverage.duration_months, RatingInput::Duration)?, brackets.dimension());
    }

    if let Some(loading) = table.category_loading(vehicle.category) {
        premium.apply(FactorDimension::Category, vehicle.category.to_string(), loading);
    }

    if let Some(history) = &request.history {
        let loadings = table.history_loadings();
        if history.prior_claims {
            premium.apply(FactorDimension::ClaimsHistory, "prior claims", loadings.prior_claims);
        }
        if history.modified {
            premium.apply(FactorDimension::Modifications, "modified vehicle", loadings.modifications);
        }
    }

    let minimum_premium_applied = premium.amount < table.minimum_premium();
    let basic = if minimum_premium_applied {
        table.minimum_premium()
    } else {
        premium.amount
    };

    let levies = table.levies();
    let currency = table.currency();
    let basic_premium = Money::new(basic, currency);
    let training_levy = Money::new(levies.training_levy.apply(basic), currency);
    let pcf_levy = Money::new(levies.pcf_levy.apply(basic), currency);
    let stamp_duty = Money::new(levies.stamp_duty, currency);
    let total_levies = sum(currency, &[training_levy, pcf_levy, stamp_duty]);
    let total_premium = sum(currency, &[basic_premium, total_levies]);

    let excess = table.excess();
    let excess_amount = excess
        .own_damage
        .map(|od| od.amount_for(declared_value))
        .unwrap_or(Decimal::ZERO);

    let young_driver_excess = match (&excess.young_driver, &request.driver) {
        (Some(rule), Some(driver)) => {
            let too_young = driver.age < rule.under_age;
            let too_new = matches!(
                (rule.min_years_licensed, driver.years_licensed),
                (Some(min), Some(years)) if years < min
            );
            (too_young || too_new).then(|| Money::new(rule.amount, currency))
        }
        _ => None,
    };

    Ok(PremiumBreakdown {
        underwriter_id: table.underwriter().clone(),
        underwriter_name: table.underwriter_name().to_string(),
        product: table.product(),
        rate_table_effective_from: table.effective_from(),
        basic_premium,
        training_levy,
        pcf_levy,
        stamp_duty,
        total_levies,
        total_premium,
        excess_amount: Money::new(excess_amount, currency),
        young_driver_excess,
        minimum_premium_applied,
        adjustments: premium.applied,
    })
}

/// Checks request inputs against the table's acceptance limits and returns
/// the vehicle age
fn validate(request: &RatingRequest, table: &RateTable) -> Result<u32, RatingError> {
    let vehicle = &request.vehicle;
    let coverage = &request.coverage;
    let acceptance = table.acceptance();

    if vehicle.declared_value <= Decimal::ZERO {
        return Err(RatingError::invalid(
            RatingInput::DeclaredValue,
            "Vehicle value must be greater than zero",
        ));
    }
    if let Some(minimum) = acceptance.minimum_sum_insured {
        if vehicle.declared_value < minimum {
            return Err(RatingError::invalid(
                RatingInput::DeclaredValue,
                format!(
                    "{} requires a vehicle value of at least {}",
                    table.underwriter_name(),
                    Money::new(minimum, table.currency())
                ),
            ));
        }
    }

    let vehicle_age = vehicle.age_on(request.rated_on)?;
    if let Some(max_age) = acceptance.max_vehicle_age {
        if vehicle_age > max_age {
            return Err(RatingError::invalid(
                RatingInput::YearOfManufacture,
                format!(
                    "{} does not cover vehicles older than {} years",
                    table.underwriter_name(),
                    max_age
                ),
            ));
        }
    }

    if !(MIN_DURATION_MONTHS..=MAX_DURATION_MONTHS).contains(&coverage.duration_months) {
        return Err(RatingError::invalid(
            RatingInput::Duration,
            format!(
                "Policy duration must be between {} and {} months",
                MIN_DURATION_MONTHS, MAX_DURATION_MONTHS
            ),
        ));
    }

    if coverage.start_date < request.rated_on {
        return Err(RatingError::invalid(
            RatingInput::StartDate,
            "Cover start date cannot be in the past",
        ));
    }

    Ok(vehicle_age)
}

fn base_premium(table: &RateTable, declared_value: Decimal, vehicle_age: u32) -> Result<Decimal, RatingError> {
    Ok(match table.base_rate() {
        BaseRate::PercentOfValue { rate } => rate.apply(declared_value),
        BaseRate::PercentOfValueByAge { rates } => {
            declared_value * lookup(rates, vehicle_age, RatingInput::YearOfManufacture)?.factor
        }
        BaseRate::Flat { amount } => *amount,
    })
}

fn lookup(table: &BracketTable, value: u32, input: RatingInput) -> Result<&Bracket, RatingError> {
    table.lookup(value).ok_or_else(|| {
        let (min, max) = table.covered_range();
        let range = if max == u32::MAX {
            format!("{} and above", min)
        } else {
            format!("{} to {}", min, max)
        };
        RatingError::invalid(
            input,
            format!("{} of {} is outside the rated range {}", table.dimension(), value, range),
        )
    })
}

fn sum(currency: Currency, parts: &[Money]) -> Money {
    Money::new(parts.iter().map(Money::amount).sum(), currency)
}

/// Running unrounded premium with the trail of applied multipliers
struct Adjusted {
    amount: Decimal,
    applied: Vec<AppliedFactor>,
}

impl Adjusted {
    fn new(amount: Decimal) -> Self {
        Self {
            amount,
            applied: Vec::new(),
        }
    }

    fn apply(&mut self, dimension: FactorDimension, label: impl Into<String>, multiplier: Decimal) {
        self.amount *= multiplier;
        self.applied.push(AppliedFactor {
            dimension,
            label: label.into(),
            multiplier,
        });
    }

    fn apply_bracket(&mut self, bracket: &Bracket, dimension: FactorDimension) {
        self.apply(dimension, bracket.label.clone(), bracket.factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Rate;
    use rust_decimal_macros::dec;

    use crate::coverage::{CoverageSelection, ProductCode, UnderwriterId};
    use crate::rate_table::{ExcessStructure, PercentageExcess, YoungDriverExcess};
    use crate::request::DriverProfile;
    use crate::vehicle::{UsageType, VehicleCategory, VehicleProfile};

    fn rated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn table() -> RateTable {
        RateTable::builder("sanlam", "Sanlam", ProductCode::TotalOwnRisk, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .base_rate(BaseRate::PercentOfValue { rate: Rate::from_percentage(dec!(0.15)) })
            .minimum_premium(dec!(3000))
            .max_vehicle_age(15)
            .vehicle_age_factors(
                BracketTable::new(
                    FactorDimension::VehicleAge,
                    vec![
                        Bracket::new(0, 3, dec!(1.2), "0-3 years"),
                        Bracket::new(4, 8, dec!(1.0), "4-8 years"),
                        Bracket::new(9, 15, dec!(0.9), "9-15 years"),
                    ],
                )
                .unwrap(),
            )
            .excess(ExcessStructure {
                own_damage: Some(PercentageExcess::new(
                    Rate::from_percentage(dec!(10)),
                    Some(dec!(50000)),
                    Some(dec!(200000)),
                )),
                young_driver: Some(YoungDriverExcess {
                    amount: dec!(10000),
                    under_age: 25,
                    min_years_licensed: None,
                }),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    fn request(value: Decimal, year: i32) -> RatingRequest {
        RatingRequest {
            vehicle: VehicleProfile {
                registration: "KDA 123A".to_string(),
                make: "Toyota".to_string(),
                model: "Axio".to_string(),
                year_of_manufacture: year,
                engine_capacity_cc: Some(1500),
                declared_value: value,
                usage: UsageType::Private,
                category: VehicleCategory::PrivateCar,
            },
            driver: None,
            coverage: CoverageSelection {
                product: ProductCode::TotalOwnRisk,
                underwriter: UnderwriterId::new("sanlam"),
                duration_months: 12,
                start_date: rated_on(),
            },
            history: None,
            rated_on: rated_on(),
        }
    }

    #[test]
    fn test_standard_bracket_at_floor() {
        let breakdown = compute_premium(&request(dec!(2_000_000), 2020), &table()).unwrap();
        assert_eq!(breakdown.basic_premium().amount(), dec!(3000));
        assert_eq!(breakdown.training_levy().amount(), dec!(6));
        assert_eq!(breakdown.pcf_levy().amount(), dec!(7.5));
        assert_eq!(breakdown.total_levies().amount(), dec!(53.5));
        assert_eq!(breakdown.total_premium().amount(), dec!(3053.5));
        assert!(!breakdown.minimum_premium_applied());
    }

    #[test]
    fn test_new_vehicle_loading_lifts_above_floor() {
        let breakdown = compute_premium(&request(dec!(2_000_000), 2024), &table()).unwrap();
        assert_eq!(breakdown.basic_premium().amount(), dec!(3600));
    }

    #[test]
    fn test_floor_applied_after_multipliers() {
        // 1,000,000 x 0.15% = 1,500, x 0.9 = 1,350, floored to 3,000
        let breakdown = compute_premium(&request(dec!(1_000_000), 2014), &table()).unwrap();
        assert_eq!(breakdown.basic_premium().amount(), dec!(3000));
        assert!(breakdown.minimum_premium_applied());
    }

    #[test]
    fn test_excess_clamped() {
        let low = compute_premium(&request(dec!(300_000), 2020), &table()).unwrap();
        let high = compute_premium(&request(dec!(5_000_000), 2020), &table()).unwrap();
        assert_eq!(low.excess_amount().amount(), dec!(50000));
        assert_eq!(high.excess_amount().amount(), dec!(200000));
    }

    #[test]
    fn test_young_driver_excess() {
        let mut req = request(dec!(2_000_000), 2020);
        req.driver = Some(DriverProfile::new(22));
        let breakdown = compute_premium(&req, &table()).unwrap();
        assert_eq!(breakdown.young_driver_excess().unwrap().amount(), dec!(10000));
    }

    #[test]
    fn test_vehicle_over_age_limit_rejected() {
        let result = compute_premium(&request(dec!(2_000_000), 2008), &table());
        assert!(matches!(
            result,
            Err(RatingError::InvalidRequest { input: RatingInput::YearOfManufacture, .. })
        ));
    }

    #[test]
    fn test_past_start_date_rejected() {
        let mut req = request(dec!(2_000_000), 2020);
        req.coverage.start_date = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        let result = compute_premium(&req, &table());
        assert!(matches!(
            result,
            Err(RatingError::InvalidRequest { input: RatingInput::StartDate, .. })
        ));
    }

    #[test]
    fn test_table_mismatch_is_configuration_error() {
        let mut req = request(dec!(2_000_000), 2020);
        req.coverage.underwriter = UnderwriterId::new("madison");
        let result = compute_premium(&req, &table());
        assert!(result.unwrap_err().is_configuration());
    }
}
