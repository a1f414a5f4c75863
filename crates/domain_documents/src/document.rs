//! Document records and their lifecycle
//!
//! ```text
//! Pending ──► Processing ──► Validated
//!    ▲            │      └──► ValidationFailed
//!    │            └─────────► UploadFailed
//!    └── (new upload for the same type replaces the record)
//! ```
//!
//! The core only ever holds an opaque reference to the captured file; the
//! bytes stay with the intake adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use core_kernel::{DocumentId, UploadId};

use crate::error::DocumentError;
use crate::validation::ValidationResult;

/// Supporting document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NationalId,
    DrivingLicense,
    Logbook,
    KraPin,
    /// Motor valuation report from an approved valuer
    ValuationReport,
}

impl DocumentType {
    pub fn key(&self) -> &'static str {
        match self {
            DocumentType::NationalId => "national_id",
            DocumentType::DrivingLicense => "driving_license",
            DocumentType::Logbook => "logbook",
            DocumentType::KraPin => "kra_pin",
            DocumentType::ValuationReport => "valuation_report",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::NationalId => "National ID",
            DocumentType::DrivingLicense => "Driving License",
            DocumentType::Logbook => "Vehicle Logbook",
            DocumentType::KraPin => "KRA PIN Certificate",
            DocumentType::ValuationReport => "Valuation Report",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Document lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    /// Extraction in flight
    Processing,
    Validated,
    ValidationFailed,
    UploadFailed,
}

/// Kind of captured file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeKind {
    Image,
    Pdf,
}

/// What the intake adapter hands over on capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedDocument {
    /// Opaque reference owned by the adapter
    pub raw_ref: String,
    pub mime_kind: MimeKind,
    pub size_bytes: u64,
}

/// Field values read from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub fields: BTreeMap<String, String>,
    /// Extraction confidence between 0 and 1
    pub confidence: f64,
}

impl Extraction {
    pub fn new(fields: BTreeMap<String, String>, confidence: f64) -> Self {
        Self {
            fields,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Returns the trimmed, non-empty value of `field`
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// The single record kept per document type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    id: DocumentId,
    document_type: DocumentType,
    required: bool,
    status: DocumentStatus,
    capture: Option<CapturedDocument>,
    upload_id: Option<UploadId>,
    extraction: Option<Extraction>,
    validation: Option<ValidationResult>,
    failure: Option<String>,
    updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// A record awaiting its first upload
    pub fn pending(document_type: DocumentType, required: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new_v7(),
            document_type,
            required,
            status: DocumentStatus::Pending,
            capture: None,
            upload_id: None,
            extraction: None,
            validation: None,
            failure: None,
            updated_at: now,
        }
    }

    /// A fresh record for a newly captured file, replacing whatever was held
    /// for this type before
    pub fn processing(
        document_type: DocumentType,
        required: bool,
        capture: CapturedDocument,
        upload_id: UploadId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status: DocumentStatus::Processing,
            capture: Some(capture),
            upload_id: Some(upload_id),
            ..Self::pending(document_type, required, now)
        }
    }

    /// Records the extraction and its validation outcome
    pub fn complete(
        &mut self,
        extraction: Extraction,
        validation: ValidationResult,
        now: DateTime<Utc>,
    ) -> Result<(), DocumentError> {
        let to = if validation.is_valid {
            DocumentStatus::Validated
        } else {
            DocumentStatus::ValidationFailed
        };
        self.ensure_processing(to)?;

        self.extraction = Some(extraction);
        self.validation = Some(validation);
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Records an adapter failure (capture, storage or extraction)
    pub fn fail_upload(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<(), DocumentError> {
        self.ensure_processing(DocumentStatus::UploadFailed)?;
        self.failure = Some(message.into());
        self.status = DocumentStatus::UploadFailed;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the validation outcome of an already extracted document,
    /// after the declared data it is checked against has changed
    pub fn revalidate(&mut self, validation: ValidationResult, now: DateTime<Utc>) -> Result<(), DocumentError> {
        let to = if validation.is_valid {
            DocumentStatus::Validated
        } else {
            DocumentStatus::ValidationFailed
        };
        if !matches!(self.status, DocumentStatus::Validated | DocumentStatus::ValidationFailed) {
            return Err(DocumentError::InvalidStateTransition { from: self.status, to });
        }
        self.validation = Some(validation);
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_processing(&self, to: DocumentStatus) -> Result<(), DocumentError> {
        if self.status != DocumentStatus::Processing {
            return Err(DocumentError::InvalidStateTransition { from: self.status, to });
        }
        Ok(())
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn capture(&self) -> Option<&CapturedDocument> {
        self.capture.as_ref()
    }

    pub fn upload_id(&self) -> Option<UploadId> {
        self.upload_id
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.extraction.as_ref().map(|e| e.confidence)
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    /// Adapter failure message, if the last upload failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_validated(&self) -> bool {
        self.status == DocumentStatus::Validated
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == DocumentStatus::Processing
    }
}
