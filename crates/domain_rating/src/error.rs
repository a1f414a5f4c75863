//! Rating domain errors
//!
//! Two families are kept strictly apart:
//! - [`RatingError::InvalidRequest`] is user-fixable and names the input at
//!   fault, so the workflow can attach it to a form field
//! - [`ConfigurationError`] is a defect in the reference data. It is never
//!   shown as a field error; the affected underwriter is withheld instead

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::coverage::{ProductCode, UnderwriterId};
use crate::factors::FactorDimension;

/// The rating input an [`RatingError::InvalidRequest`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingInput {
    DeclaredValue,
    YearOfManufacture,
    EngineCapacity,
    UsageType,
    VehicleCategory,
    DriverAge,
    YearsLicensed,
    Underwriter,
    Product,
    Duration,
    StartDate,
}

impl fmt::Display for RatingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RatingInput::DeclaredValue => "declared value",
            RatingInput::YearOfManufacture => "year of manufacture",
            RatingInput::EngineCapacity => "engine capacity",
            RatingInput::UsageType => "usage type",
            RatingInput::VehicleCategory => "vehicle category",
            RatingInput::DriverAge => "driver age",
            RatingInput::YearsLicensed => "years licensed",
            RatingInput::Underwriter => "underwriter",
            RatingInput::Product => "product",
            RatingInput::Duration => "duration",
            RatingInput::StartDate => "start date",
        };
        f.write_str(name)
    }
}

/// Errors returned by the rating engine and service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    /// Missing or out-of-range rating input
    #[error("Invalid rating request ({input}): {message}")]
    InvalidRequest {
        input: RatingInput,
        message: String,
    },

    /// The reference data cannot rate this request
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl RatingError {
    pub fn invalid(input: RatingInput, message: impl Into<String>) -> Self {
        RatingError::InvalidRequest {
            input,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RatingError::Configuration(_))
    }
}

/// Defects in the rate table reference data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No rate table for underwriter {underwriter} and product {product}")]
    RateTableNotFound {
        underwriter: UnderwriterId,
        product: ProductCode,
    },

    #[error("No {product} rate table from {underwriter} is in effect on {date}")]
    NoVersionInEffect {
        underwriter: UnderwriterId,
        product: ProductCode,
        date: NaiveDate,
    },

    #[error("Duplicate {product} rate table from {underwriter} effective {effective_from}")]
    DuplicateVersion {
        underwriter: UnderwriterId,
        product: ProductCode,
        effective_from: NaiveDate,
    },

    #[error("Rate table {underwriter}/{product} was applied to a request for {requested}")]
    TableMismatch {
        underwriter: UnderwriterId,
        product: ProductCode,
        requested: String,
    },

    #[error("{dimension} bracket table is empty")]
    EmptyBracketTable { dimension: FactorDimension },

    #[error("{dimension} bracket {min}..={max} is invalid: {reason}")]
    InvalidBracket {
        dimension: FactorDimension,
        min: u32,
        max: u32,
        reason: String,
    },

    #[error("{dimension} brackets {first} and {second} overlap")]
    OverlappingBrackets {
        dimension: FactorDimension,
        first: String,
        second: String,
    },

    #[error("{dimension} brackets leave a gap between {after} and {next}")]
    BracketGap {
        dimension: FactorDimension,
        after: u32,
        next: u32,
    },

    #[error("Invalid effective date {year}-{month:02}-{day:02}")]
    InvalidEffectiveDate { year: i32, month: u32, day: u32 },

    #[error("Invalid rate table {underwriter}/{product}: {message}")]
    InvalidRateTable {
        underwriter: UnderwriterId,
        product: ProductCode,
        message: String,
    },
}
