//! Coverage selection: product, underwriter, duration and start date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::{RatingError, RatingInput};

/// Motor cover products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCode {
    ThirdParty,
    ThirdPartyFireTheft,
    Comprehensive,
    /// Total own risk: lower premium against a higher excess
    TotalOwnRisk,
}

impl ProductCode {
    pub const ALL: [ProductCode; 4] = [
        ProductCode::ThirdParty,
        ProductCode::ThirdPartyFireTheft,
        ProductCode::Comprehensive,
        ProductCode::TotalOwnRisk,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProductCode::ThirdParty => "third_party",
            ProductCode::ThirdPartyFireTheft => "third_party_fire_theft",
            ProductCode::Comprehensive => "comprehensive",
            ProductCode::TotalOwnRisk => "tor",
        }
    }

    /// Returns true if the product pays for damage to the insured vehicle
    pub fn covers_own_damage(&self) -> bool {
        matches!(self, ProductCode::Comprehensive | ProductCode::TotalOwnRisk)
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProductCode {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "third_party" | "tp" => Ok(ProductCode::ThirdParty),
            "third_party_fire_theft" | "tpft" => Ok(ProductCode::ThirdPartyFireTheft),
            "comprehensive" => Ok(ProductCode::Comprehensive),
            "tor" | "total_own_risk" => Ok(ProductCode::TotalOwnRisk),
            other => Err(RatingError::invalid(
                RatingInput::Product,
                format!("Unknown cover type '{}'", other),
            )),
        }
    }
}

/// Underwriter identifier, e.g. `sanlam`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnderwriterId(String);

impl UnderwriterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for UnderwriterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnderwriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnderwriterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The cover being quoted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSelection {
    pub product: ProductCode,
    pub underwriter: UnderwriterId,
    /// Policy duration in months, 1 to 12
    pub duration_months: u32,
    pub start_date: NaiveDate,
}

impl CoverageSelection {
    /// Returns a copy of this selection for a different underwriter
    pub fn with_underwriter(&self, underwriter: UnderwriterId) -> Self {
        Self {
            underwriter,
            ..self.clone()
        }
    }
}
