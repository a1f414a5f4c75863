//! Supporting Document Domain
//!
//! This crate models the documents a proposer uploads (national ID, driving
//! licence, logbook, KRA PIN certificate, valuation report) and validates the
//! fields an extraction adapter reads from them.
//!
//! # Architecture
//!
//! - [`DocumentSchema`]: declarative per-type rules, built by [`catalog`]
//! - [`validate_document`]: pure pattern and cross-record ("must match")
//!   validation, reporting every failure at once
//! - [`DocumentRecord`]: one record per type with an explicit lifecycle
//! - [`DocumentIntakePort`]: the boundary to the capture and extraction adapter

pub mod error;
pub mod patterns;
pub mod document;
pub mod schema;
pub mod catalog;
pub mod validation;
pub mod ports;

pub use error::DocumentError;
pub use document::{
    DocumentType, DocumentStatus, DocumentRecord, CapturedDocument, Extraction, MimeKind,
};
pub use schema::{DocumentSchema, FieldRule, ExtractedFieldRule, MustMatch, Normalization};
pub use catalog::{DocumentCatalog, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_RECENT_MONTHS};
pub use validation::{
    ValidationResult, DeclaredFields, validate_document, validate_patterns, cross_validate,
    parse_document_date, normalize, LOW_CONFIDENCE_THRESHOLD,
};
pub use ports::DocumentIntakePort;
