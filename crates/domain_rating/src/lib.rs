//! Motor Premium Rating Domain
//!
//! This crate prices motor cover for a single vehicle against an
//! underwriter's published rate table.
//!
//! # Architecture
//!
//! - [`RateTableRegistry`]: read-only, versioned rate tables keyed by
//!   underwriter and product, frozen after construction and shared by `Arc`
//! - [`compute_premium`]: the pure rating function, no I/O, no mutation
//! - [`RatingService`]: looks up the table in effect for a request and rates
//!   it, or rates the same request across several underwriters
//!
//! Lookup misses are always [`ConfigurationError`]s and are kept apart from
//! user-fixable [`RatingError::InvalidRequest`] failures.

pub mod error;
pub mod vehicle;
pub mod coverage;
pub mod request;
pub mod factors;
pub mod rate_table;
pub mod registry;
pub mod catalog;
pub mod breakdown;
pub mod engine;
pub mod services;

pub use error::{RatingError, ConfigurationError, RatingInput};
pub use vehicle::{VehicleProfile, UsageType, VehicleCategory, EARLIEST_MANUFACTURE_YEAR};
pub use coverage::{CoverageSelection, ProductCode, UnderwriterId};
pub use request::{DriverProfile, RatingHistory, RatingRequest};
pub use factors::{Bracket, BracketTable, FactorDimension};
pub use rate_table::{
    RateTable, RateTableBuilder, BaseRate, ExcessStructure, PercentageExcess,
    YoungDriverExcess, StatutoryLevies, FactorTables, HistoryLoadings, AcceptanceLimits,
};
pub use registry::{RateTableRegistry, RateTableRegistryBuilder, UnderwriterSummary};
pub use breakdown::{PremiumBreakdown, AppliedFactor};
pub use engine::compute_premium;
pub use services::{RatingService, UnderwriterQuote};
