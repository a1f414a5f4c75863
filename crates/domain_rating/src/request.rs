//! The rating request handed to the engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::temporal::age_on;

use crate::coverage::CoverageSelection;
use crate::vehicle::VehicleProfile;

/// The main driver, used only for factor lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    /// Age in completed years on the rating date
    pub age: u32,
    pub years_licensed: Option<u32>,
}

impl DriverProfile {
    pub fn new(age: u32) -> Self {
        Self {
            age,
            years_licensed: None,
        }
    }

    /// Derives the driver's age from a date of birth
    pub fn from_date_of_birth(date_of_birth: NaiveDate, rated_on: NaiveDate) -> Self {
        Self::new(age_on(date_of_birth, rated_on))
    }

    pub fn with_years_licensed(mut self, years: u32) -> Self {
        self.years_licensed = Some(years);
        self
    }
}

/// Claims and modification history declared on the proposal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingHistory {
    /// A claim was made in the last three years
    pub prior_claims: bool,
    /// The vehicle carries non-factory modifications
    pub modified: bool,
}

/// Everything the engine needs to price one vehicle with one underwriter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub vehicle: VehicleProfile,
    pub driver: Option<DriverProfile>,
    pub coverage: CoverageSelection,
    pub history: Option<RatingHistory>,
    /// The date the quote is produced. Vehicle age and the start-date check
    /// are evaluated against it.
    pub rated_on: NaiveDate,
}
