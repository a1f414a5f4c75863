//! Core Kernel - Foundational types shared by the quotation domains
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money and rate types with precise decimal arithmetic
//! - A clock abstraction evaluated in the jurisdiction's calendar
//! - Typed identifiers
//! - The adapter failure taxonomy used by every port

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate, round_to_minor_unit};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError};
pub use identifiers::{QuotationId, SubmissionId, DocumentId, UploadId};
pub use ports::{PortError, DomainPort, OperationMetadata};
