//! Ports and Adapters Infrastructure
//!
//! The quotation core never performs I/O itself. Document extraction and
//! final submission are reached through port traits defined in the domain
//! crates; the adapters behind them live outside the core.
//!
//! # Architecture Overview
//!
//! ```text
//!          QuotationWorkflow (core, no I/O)
//!                 │                  │
//!                 ▼                  ▼
//!        DocumentIntakePort     SubmissionPort
//!          (domain_documents)    (domain_quotation)
//!                 ▲                  ▲
//!                 │                  │
//!       capture + OCR adapter    draft store / pricing backend
//! ```
//!
//! Every adapter failure is reported as a [`PortError`]. The core treats all
//! of them as retryable by user action only: nothing here retries on its own.

use thiserror::Error;

use crate::identifiers::QuotationId;

/// Failure reported by an adapter
///
/// The submission adapter reports `Connection`, `Rejected` or `Timeout`; the
/// intake adapter reports `Extraction` or `Storage`. The remaining variants
/// cover an adapter that cannot be reached or fails on its own side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// Network failure between the device and the remote system
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// The remote system received the request and refused it
    #[error("Rejected: {reason}")]
    Rejected { reason: String },

    /// No usable fields could be read from a captured document
    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    /// A captured file or draft could not be written locally
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection { message: message.into() }
    }

    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        PortError::Rejected { reason: reason.into() }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        PortError::Extraction { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        PortError::Storage { message: message.into() }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable { service: service.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal { message: message.into() }
    }

    /// True when the same request may succeed if the user tries again.
    /// Informational only, the core never acts on it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Short machine-readable category, used in logs and submission events
    pub fn kind(&self) -> &'static str {
        match self {
            PortError::Connection { .. } => "network",
            PortError::Timeout { .. } => "timeout",
            PortError::Rejected { .. } => "rejected",
            PortError::Extraction { .. } => "extraction",
            PortError::Storage { .. } => "storage",
            PortError::ServiceUnavailable { .. } => "unavailable",
            PortError::Internal { .. } => "internal",
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so adapters can be shared across
/// tasks behind `&dyn` or `Arc<dyn>`.
pub trait DomainPort: Send + Sync + 'static {}

/// Context handed to an adapter alongside each call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMetadata {
    /// Identifier of the upload or submission attempt, for tracing across systems
    pub correlation_id: Option<String>,
    /// The quotation the call belongs to
    pub quotation_id: Option<QuotationId>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn for_quotation(mut self, quotation_id: QuotationId) -> Self {
        self.quotation_id = Some(quotation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::timeout("submit quotation", 30_000).is_transient());
        assert!(PortError::connection("reset by peer").is_transient());
        assert!(PortError::unavailable("pricing backend").is_transient());
        assert!(!PortError::rejected("duplicate registration").is_transient());
        assert!(!PortError::extraction("unreadable image").is_transient());
    }

    #[test]
    fn test_submission_failure_kinds() {
        assert_eq!(PortError::connection("down").kind(), "network");
        assert_eq!(PortError::rejected("no").kind(), "rejected");
        assert_eq!(PortError::timeout("submit quotation", 5).kind(), "timeout");
    }

    #[test]
    fn test_operation_metadata() {
        let quotation_id = QuotationId::new_v7();
        let metadata = OperationMetadata::with_correlation_id("UPL-1").for_quotation(quotation_id);

        assert_eq!(metadata.correlation_id.as_deref(), Some("UPL-1"));
        assert_eq!(metadata.quotation_id, Some(quotation_id));
    }
}
