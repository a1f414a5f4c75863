//! Domain events for the quotation draft
//!
//! Accumulated on the draft and drained with `take_events` for the audit
//! trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{QuotationId, SubmissionId, UploadId};
use domain_documents::{DocumentStatus, DocumentType};
use domain_rating::UnderwriterId;

use crate::fields::FormField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuotationEvent {
    QuotationStarted {
        quotation_id: QuotationId,
        timestamp: DateTime<Utc>,
    },

    StepAdvanced {
        quotation_id: QuotationId,
        from: usize,
        to: usize,
        timestamp: DateTime<Utc>,
    },

    StepRetreated {
        quotation_id: QuotationId,
        from: usize,
        to: usize,
        timestamp: DateTime<Utc>,
    },

    StepJumped {
        quotation_id: QuotationId,
        from: usize,
        to: usize,
        timestamp: DateTime<Utc>,
    },

    PremiumComputed {
        quotation_id: QuotationId,
        underwriter: UnderwriterId,
        total_premium: Decimal,
        currency: String,
        timestamp: DateTime<Utc>,
    },

    /// A rating-relevant field changed and the premium was dropped
    PremiumInvalidated {
        quotation_id: QuotationId,
        field: FormField,
        timestamp: DateTime<Utc>,
    },

    DocumentUploadStarted {
        quotation_id: QuotationId,
        document_type: DocumentType,
        upload_id: UploadId,
        timestamp: DateTime<Utc>,
    },

    /// Extraction finished, or a declared field it is checked against changed
    DocumentValidated {
        quotation_id: QuotationId,
        document_type: DocumentType,
        status: DocumentStatus,
        error_count: usize,
        timestamp: DateTime<Utc>,
    },

    DocumentUploadFailed {
        quotation_id: QuotationId,
        document_type: DocumentType,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    FieldAutofilled {
        quotation_id: QuotationId,
        field: FormField,
        document_type: DocumentType,
        timestamp: DateTime<Utc>,
    },

    SubmissionStarted {
        quotation_id: QuotationId,
        submission_id: SubmissionId,
        timestamp: DateTime<Utc>,
    },

    QuotationSubmitted {
        quotation_id: QuotationId,
        submission_id: SubmissionId,
        reference_id: String,
        timestamp: DateTime<Utc>,
    },

    SubmissionFailed {
        quotation_id: QuotationId,
        submission_id: SubmissionId,
        failure_kind: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    QuotationCancelled {
        quotation_id: QuotationId,
        timestamp: DateTime<Utc>,
    },
}
