//! Document Intake Port
//!
//! The capture and extraction adapter (camera, file picker, OCR service) sits
//! behind [`DocumentIntakePort`]. The core hands it the opaque capture
//! reference and consumes only the extracted field map and confidence.
//!
//! # Architecture
//!
//! - **OCR Adapter**: calls an extraction service with the stored file
//! - **Mock Adapter**: canned extractions for tests (see `test_utils`)
//!
//! A failure of any kind is a [`PortError`]. The workflow records it as
//! `UploadFailed` and leaves retrying to the user.
//!
//! # Usage
//!
//! ```rust,ignore
//! let extraction = intake
//!     .extract(DocumentType::Logbook, &capture, None)
//!     .await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, OperationMetadata, PortError};

use crate::document::{CapturedDocument, DocumentType, Extraction};

/// Port to the document capture and extraction adapter
#[async_trait]
pub trait DocumentIntakePort: DomainPort {
    /// Reads the fields of a captured document
    ///
    /// # Arguments
    ///
    /// * `document_type` - The type the proposer uploaded the file as
    /// * `capture` - Opaque reference, kind and size of the captured file
    /// * `metadata` - Optional correlation metadata for tracing
    async fn extract(
        &self,
        document_type: DocumentType,
        capture: &CapturedDocument,
        metadata: Option<OperationMetadata>,
    ) -> Result<Extraction, PortError>;
}
