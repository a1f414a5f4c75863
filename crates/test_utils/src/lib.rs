//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! motor quotation core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built proposals, extractions and clocks
//! - `builders`: Builder patterns for rating requests and extractions
//! - `mocks`: In-memory intake and submission adapters
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod mocks;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use mocks::*;
pub use assertions::*;
pub use generators::*;
