//! Factor bracket tables
//!
//! A bracket table maps a whole-number input (vehicle age in years, engine
//! capacity in cc, driver age, policy months) to a multiplier. Brackets are
//! closed intervals `min..=max`. A table is only constructed if its brackets
//! are ordered, non-overlapping and leave no gap, so a lookup either finds
//! exactly one bracket or the value lies outside the table's covered range.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;

/// The rating dimensions a factor can be keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorDimension {
    BaseRate,
    VehicleAge,
    EngineCapacity,
    Usage,
    DriverAge,
    Duration,
    Category,
    ClaimsHistory,
    Modifications,
}

impl fmt::Display for FactorDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactorDimension::BaseRate => "base rate",
            FactorDimension::VehicleAge => "vehicle age",
            FactorDimension::EngineCapacity => "engine capacity",
            FactorDimension::Usage => "usage",
            FactorDimension::DriverAge => "driver age",
            FactorDimension::Duration => "duration",
            FactorDimension::Category => "category",
            FactorDimension::ClaimsHistory => "claims history",
            FactorDimension::Modifications => "modifications",
        };
        f.write_str(name)
    }
}

/// One closed interval of a bracket table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub min: u32,
    pub max: u32,
    pub factor: Decimal,
    pub label: String,
}

impl Bracket {
    pub fn new(min: u32, max: u32, factor: Decimal, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            factor,
            label: label.into(),
        }
    }

    /// A bracket with no upper bound
    pub fn from(min: u32, factor: Decimal, label: impl Into<String>) -> Self {
        Self::new(min, u32::MAX, factor, label)
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    fn describe(&self) -> String {
        if self.max == u32::MAX {
            format!("{}+", self.min)
        } else {
            format!("{}..={}", self.min, self.max)
        }
    }
}

/// A validated, immutable set of brackets for one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    dimension: FactorDimension,
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Builds a table, ordering brackets by their lower bound
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the table is empty, a bracket has
    /// `min > max` or a non-positive factor, two brackets overlap, or
    /// consecutive brackets leave a gap.
    pub fn new(dimension: FactorDimension, mut brackets: Vec<Bracket>) -> Result<Self, ConfigurationError> {
        if brackets.is_empty() {
            return Err(ConfigurationError::EmptyBracketTable { dimension });
        }

        brackets.sort_by_key(|b| (b.min, b.max));

        for bracket in &brackets {
            if bracket.min > bracket.max {
                return Err(ConfigurationError::InvalidBracket {
                    dimension,
                    min: bracket.min,
                    max: bracket.max,
                    reason: "lower bound exceeds upper bound".to_string(),
                });
            }
            if bracket.factor <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidBracket {
                    dimension,
                    min: bracket.min,
                    max: bracket.max,
                    reason: format!("factor {} must be positive", bracket.factor),
                });
            }
        }

        for pair in brackets.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.min <= prev.max {
                return Err(ConfigurationError::OverlappingBrackets {
                    dimension,
                    first: prev.describe(),
                    second: next.describe(),
                });
            }
            if next.min != prev.max + 1 {
                return Err(ConfigurationError::BracketGap {
                    dimension,
                    after: prev.max,
                    next: next.min,
                });
            }
        }

        Ok(Self { dimension, brackets })
    }

    pub fn dimension(&self) -> FactorDimension {
        self.dimension
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Returns the lowest-ordered bracket containing `value`
    pub fn lookup(&self, value: u32) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.contains(value))
    }

    /// The inclusive range of values this table covers
    pub fn covered_range(&self) -> (u32, u32) {
        let first = &self.brackets[0];
        let last = &self.brackets[self.brackets.len() - 1];
        (first.min, last.max)
    }
}

impl<'de> Deserialize<'de> for BracketTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            dimension: FactorDimension,
            brackets: Vec<Bracket>,
        }

        let raw = Raw::deserialize(deserializer)?;
        BracketTable::new(raw.dimension, raw.brackets).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vehicle_age_table() -> BracketTable {
        BracketTable::new(
            FactorDimension::VehicleAge,
            vec![
                Bracket::new(4, 8, dec!(1.0), "4-8 years"),
                Bracket::new(0, 3, dec!(1.2), "0-3 years"),
                Bracket::new(9, 15, dec!(0.9), "9-15 years"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_inclusive_bounds() {
        let table = vehicle_age_table();
        assert_eq!(table.lookup(0).unwrap().factor, dec!(1.2));
        assert_eq!(table.lookup(3).unwrap().factor, dec!(1.2));
        assert_eq!(table.lookup(4).unwrap().factor, dec!(1.0));
        assert_eq!(table.lookup(15).unwrap().factor, dec!(0.9));
        assert!(table.lookup(16).is_none());
    }

    #[test]
    fn test_brackets_are_ordered() {
        let table = vehicle_age_table();
        assert_eq!(table.brackets()[0].label, "0-3 years");
        assert_eq!(table.covered_range(), (0, 15));
    }

    #[test]
    fn test_overlap_rejected() {
        let result = BracketTable::new(
            FactorDimension::EngineCapacity,
            vec![
                Bracket::new(0, 1000, dec!(0.9), "small"),
                Bracket::new(1000, 1800, dec!(1.0), "medium"),
            ],
        );
        assert!(matches!(result, Err(ConfigurationError::OverlappingBrackets { .. })));
    }

    #[test]
    fn test_gap_rejected() {
        let result = BracketTable::new(
            FactorDimension::EngineCapacity,
            vec![
                Bracket::new(0, 1000, dec!(0.9), "small"),
                Bracket::new(1002, 1800, dec!(1.0), "medium"),
            ],
        );
        assert_eq!(
            result,
            Err(ConfigurationError::BracketGap {
                dimension: FactorDimension::EngineCapacity,
                after: 1000,
                next: 1002,
            })
        );
    }

    #[test]
    fn test_open_ended_bracket() {
        let table = BracketTable::new(
            FactorDimension::EngineCapacity,
            vec![
                Bracket::new(0, 3000, dec!(1.0), "up to 3000cc"),
                Bracket::from(3001, dec!(1.3), "above 3000cc"),
            ],
        )
        .unwrap();
        assert_eq!(table.lookup(u32::MAX).unwrap().factor, dec!(1.3));
    }

    #[test]
    fn test_non_positive_factor_rejected() {
        let result = BracketTable::new(
            FactorDimension::Duration,
            vec![Bracket::new(1, 12, dec!(0), "annual")],
        );
        assert!(matches!(result, Err(ConfigurationError::InvalidBracket { .. })));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(
            BracketTable::new(FactorDimension::DriverAge, vec![]),
            Err(ConfigurationError::EmptyBracketTable { dimension: FactorDimension::DriverAge })
        );
    }
}
