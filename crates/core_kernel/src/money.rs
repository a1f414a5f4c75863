//! Money types with precise decimal arithmetic
//!
//! Monetary values are carried as `rust_decimal::Decimal` so that premium
//! arithmetic never passes through floating point. Rounding to the currency's
//! minor unit is an explicit step: intermediate rating values stay unrounded
//! and only the figures that leave the engine are rounded, once.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Currencies a rate table may be published in (ISO 4217)
///
/// Local tariffs are in shillings; dollar tables cover imported and
/// diplomatic vehicles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    KES,
    USD,
}

impl Currency {
    const ALL: [Currency; 2] = [Currency::KES, Currency::USD];

    /// Number of decimal places in the minor unit (cents for both)
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Symbol used when printing quotes
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::KES => "KSh",
            Currency::USD => "$",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::KES => "KES",
            Currency::USD => "USD",
        }
    }

    /// Parses an ISO 4217 code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Result<Self, MoneyError> {
        let wanted = code.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MoneyError::UnknownCurrency(wanted.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// A monetary amount with associated currency
///
/// Amounts are always held at the currency's minor unit. Construction rounds
/// half away from zero, which is how premium schedules are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value rounded to the currency's minor unit
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: round_to_minor_unit(amount, currency),
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

/// Rounds a raw decimal to the minor unit of `currency`, half away from zero
pub fn round_to_minor_unit(amount: Decimal, currency: Currency) -> Decimal {
    amount.round_dp_with_strategy(
        currency.decimal_places(),
        RoundingStrategy::MidpointAwayFromZero,
    )
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places() as usize;
        write!(f, "{} {:.dp$}", self.currency.symbol(), self.amount, dp = dp)
    }
}

/// A proportional rate: base rate, levy rate or excess percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a fraction (0.0015 for 0.15%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a fraction (0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (0.15 for 0.15%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to an unrounded amount, leaving the result unrounded
    pub fn apply(&self, amount: Decimal) -> Decimal {
        amount * self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_is_always_at_minor_unit(
            mantissa in -1_000_000_000i64..1_000_000_000i64,
            scale in 0u32..8u32
        ) {
            let money = Money::new(Decimal::new(mantissa, scale), Currency::KES);
            prop_assert!(money.amount().scale() <= 2);
        }

        #[test]
        fn rounding_is_idempotent(mantissa in -1_000_000_000i64..1_000_000_000i64, scale in 0u32..8u32) {
            let once = round_to_minor_unit(Decimal::new(mantissa, scale), Currency::KES);
            prop_assert_eq!(round_to_minor_unit(once, Currency::KES), once);
        }
    }
}
