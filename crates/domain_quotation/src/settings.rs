//! Workflow settings
//!
//! Plain values handed in by the process edge. The domain never reads the
//! environment itself.

use serde::{Deserialize, Serialize};

use domain_documents::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_RECENT_MONTHS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Largest accepted document file
    pub max_upload_bytes: u64,
    /// How old a valuation report may be
    pub recent_document_months: u32,
    /// Fill empty declared fields from validated document extractions
    pub autofill_declared_fields: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            recent_document_months: DEFAULT_RECENT_MONTHS,
            autofill_declared_fields: true,
        }
    }
}
