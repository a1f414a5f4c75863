//! Document domain errors

use thiserror::Error;

use crate::document::{DocumentStatus, DocumentType, MimeKind};

/// Errors that can occur while handling supporting documents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Invalid lifecycle transition attempted
    #[error("Invalid document state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// The document type is not part of the current product's document set
    #[error("{0} is not requested for this cover")]
    NotRequested(DocumentType),

    /// The captured file is larger than allowed
    #[error("{document_type} file is {size_bytes} bytes, the limit is {limit_bytes} bytes")]
    FileTooLarge {
        document_type: DocumentType,
        size_bytes: u64,
        limit_bytes: u64,
    },

    /// The captured file kind is not accepted for this document
    #[error("{document_type} cannot be uploaded as {mime_kind:?}")]
    UnsupportedFormat {
        document_type: DocumentType,
        mime_kind: MimeKind,
    },
}
