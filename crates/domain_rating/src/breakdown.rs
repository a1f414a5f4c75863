//! Premium breakdown produced by the rating engine

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::coverage::{ProductCode, UnderwriterId};
use crate::factors::FactorDimension;

/// One multiplier the engine applied to the base premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub dimension: FactorDimension,
    pub label: String,
    pub multiplier: Decimal,
}

/// The priced quote for one underwriter
///
/// Every monetary component is rounded once to the currency's minor unit.
/// `total_levies` and `total_premium` are sums of the rounded components, so
/// `total_premium == basic_premium + training_levy + pcf_levy + stamp_duty`
/// holds exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub(crate) underwriter_id: UnderwriterId,
    pub(crate) underwriter_name: String,
    pub(crate) product: ProductCode,
    pub(crate) rate_table_effective_from: NaiveDate,
    pub(crate) basic_premium: Money,
    pub(crate) training_levy: Money,
    pub(crate) pcf_levy: Money,
    pub(crate) stamp_duty: Money,
    pub(crate) total_levies: Money,
    pub(crate) total_premium: Money,
    pub(crate) excess_amount: Money,
    pub(crate) young_driver_excess: Option<Money>,
    pub(crate) minimum_premium_applied: bool,
    pub(crate) adjustments: Vec<AppliedFactor>,
}

impl PremiumBreakdown {
    pub fn underwriter_id(&self) -> &UnderwriterId {
        &self.underwriter_id
    }

    pub fn underwriter_name(&self) -> &str {
        &self.underwriter_name
    }

    pub fn product(&self) -> ProductCode {
        self.product
    }

    /// Effective date of the rate table version that priced this quote
    pub fn rate_table_effective_from(&self) -> NaiveDate {
        self.rate_table_effective_from
    }

    pub fn currency(&self) -> Currency {
        self.total_premium.currency()
    }

    pub fn basic_premium(&self) -> Money {
        self.basic_premium
    }

    pub fn training_levy(&self) -> Money {
        self.training_levy
    }

    pub fn pcf_levy(&self) -> Money {
        self.pcf_levy
    }

    pub fn stamp_duty(&self) -> Money {
        self.stamp_duty
    }

    pub fn total_levies(&self) -> Money {
        self.total_levies
    }

    pub fn total_premium(&self) -> Money {
        self.total_premium
    }

    /// Own-damage excess; zero for products without own-damage cover
    pub fn excess_amount(&self) -> Money {
        self.excess_amount
    }

    pub fn young_driver_excess(&self) -> Option<Money> {
        self.young_driver_excess
    }

    /// True if the basic premium was raised to the table's minimum
    pub fn minimum_premium_applied(&self) -> bool {
        self.minimum_premium_applied
    }

    /// Multipliers applied, in application order
    pub fn adjustments(&self) -> &[AppliedFactor] {
        &self.adjustments
    }
}
