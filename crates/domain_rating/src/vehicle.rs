//! Vehicle attributes used for rating

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RatingError, RatingInput};

/// Oldest model year any tariff rates
pub const EARLIEST_MANUFACTURE_YEAR: i32 = 1950;

/// How the vehicle is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// Private and domestic use
    Private,
    /// Business use by the owner
    Business,
    /// Ride-hailing, taxi or other commercial carriage for hire
    RideHailing,
}

impl UsageType {
    pub fn key(&self) -> &'static str {
        match self {
            UsageType::Private => "private",
            UsageType::Business => "business",
            UsageType::RideHailing => "ride_hailing",
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UsageType {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(UsageType::Private),
            "business" => Ok(UsageType::Business),
            "ride_hailing" | "ride-hailing" | "uber" | "commercial" => Ok(UsageType::RideHailing),
            other => Err(RatingError::invalid(
                RatingInput::UsageType,
                format!("Unknown usage type '{}'", other),
            )),
        }
    }
}

/// Body or licensing category of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    PrivateCar,
    Motorcycle,
    /// Public service vehicle (matatu, bus)
    Psv,
    Commercial,
    Tuktuk,
    /// Special vehicles (tractors, cranes, ambulances)
    Special,
}

impl VehicleCategory {
    pub fn key(&self) -> &'static str {
        match self {
            VehicleCategory::PrivateCar => "private_car",
            VehicleCategory::Motorcycle => "motorcycle",
            VehicleCategory::Psv => "psv",
            VehicleCategory::Commercial => "commercial",
            VehicleCategory::Tuktuk => "tuktuk",
            VehicleCategory::Special => "special",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VehicleCategory {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private_car" | "private" => Ok(VehicleCategory::PrivateCar),
            "motorcycle" => Ok(VehicleCategory::Motorcycle),
            "psv" => Ok(VehicleCategory::Psv),
            "commercial" => Ok(VehicleCategory::Commercial),
            "tuktuk" => Ok(VehicleCategory::Tuktuk),
            "special" => Ok(VehicleCategory::Special),
            other => Err(RatingError::invalid(
                RatingInput::VehicleCategory,
                format!("Unknown vehicle category '{}'", other),
            )),
        }
    }
}

/// The insured vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Registration plate, e.g. `KDA 123A`
    pub registration: String,
    pub make: String,
    pub model: String,
    pub year_of_manufacture: i32,
    /// Engine capacity in cc. `None` for electric vehicles, which skip the
    /// engine-capacity factor.
    pub engine_capacity_cc: Option<u32>,
    /// Declared (sum insured) value in major currency units
    pub declared_value: Decimal,
    pub usage: UsageType,
    pub category: VehicleCategory,
}

impl VehicleProfile {
    /// Age in whole years on `on`.
    ///
    /// A vehicle manufactured next year (new model year) is age zero; anything
    /// later, or earlier than [`EARLIEST_MANUFACTURE_YEAR`], is rejected.
    pub fn age_on(&self, on: NaiveDate) -> Result<u32, RatingError> {
        let current_year = on.year();
        if self.year_of_manufacture > current_year.saturating_add(1) {
            return Err(RatingError::invalid(
                RatingInput::YearOfManufacture,
                format!(
                    "Year of manufacture {} is in the future",
                    self.year_of_manufacture
                ),
            ));
        }
        if self.year_of_manufacture < EARLIEST_MANUFACTURE_YEAR {
            return Err(RatingError::invalid(
                RatingInput::YearOfManufacture,
                format!(
                    "Year of manufacture must be {} or later",
                    EARLIEST_MANUFACTURE_YEAR
                ),
            ));
        }
        current_year
            .checked_sub(self.year_of_manufacture)
            .map(|age| age.max(0) as u32)
            .ok_or_else(|| {
                RatingError::invalid(
                    RatingInput::YearOfManufacture,
                    format!("Year of manufacture {} cannot be rated", self.year_of_manufacture),
                )
            })
    }
}
