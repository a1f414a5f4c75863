//! Submission payload and the persistence/transport port
//!
//! The payload is the serializable form of a finished quotation: the proposer,
//! the rated vehicle and cover, document metadata (never file contents), the
//! premium breakdown and the payment selection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, OperationMetadata, PortError, QuotationId, SubmissionId, UploadId};
use domain_documents::{DocumentStatus, DocumentType};
use domain_rating::{CoverageSelection, DriverProfile, PremiumBreakdown, RatingHistory, VehicleProfile};

use crate::payment::PaymentSelection;

/// Who is proposing the cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposerDetails {
    pub full_name: String,
    pub id_number: String,
    pub phone: String,
    pub email: String,
    pub kra_pin: Option<String>,
}

/// Metadata of one uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub upload_id: Option<UploadId>,
    /// Opaque reference held by the intake adapter
    pub raw_ref: Option<String>,
    pub confidence: Option<f64>,
}

/// Everything the transport adapter sends for a finished quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub submission_id: SubmissionId,
    pub quotation_id: QuotationId,
    pub proposer: ProposerDetails,
    pub vehicle: VehicleProfile,
    pub driver: Option<DriverProfile>,
    pub coverage: CoverageSelection,
    pub history: Option<RatingHistory>,
    pub documents: Vec<DocumentSummary>,
    pub premium: PremiumBreakdown,
    pub payment: PaymentSelection,
    pub prepared_at: DateTime<Utc>,
}

impl SubmissionPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The adapter's success signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Reference assigned by the receiving system
    pub reference_id: String,
}

/// Port to the persistence and transport adapter
///
/// Failures are reported as `PortError::Connection` (network),
/// `PortError::Rejected` or `PortError::Timeout`. The workflow never retries
/// on its own.
#[async_trait]
pub trait SubmissionPort: DomainPort {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError>;
}
