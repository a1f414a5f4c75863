//! Declarative document schemas
//!
//! A schema lists, for one document type, the rule each extracted field must
//! satisfy and the extracted fields that must agree with the proposer's
//! declared form values. Fields without a rule are not validated.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{CapturedDocument, DocumentType, MimeKind};
use crate::error::DocumentError;

/// Rule applied to one extracted field
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// The value must match the pattern
    Pattern(Regex),
    /// The value must be a date strictly after today
    Future,
    /// The value must be a date no earlier than `months` months ago and not
    /// after today
    Recent { months: u32 },
}

#[derive(Debug, Clone)]
pub struct ExtractedFieldRule {
    pub field: String,
    pub rule: FieldRule,
}

/// How values are normalized before a must-match comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Trim, collapse inner whitespace, case-fold
    Text,
    /// Drop whitespace and hyphens, case-fold
    Identifier,
    /// Compare as decimal numbers, ignoring thousands separators
    Numeric,
    /// Compare as calendar dates in any accepted date format
    Date,
}

/// An extracted field that must equal a declared form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustMatch {
    pub extracted_field: String,
    pub form_field: String,
    pub normalization: Normalization,
}

/// Everything that is checked for one document type
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    document_type: DocumentType,
    required: bool,
    rules: Vec<ExtractedFieldRule>,
    must_match: Vec<MustMatch>,
    accepted_formats: Vec<MimeKind>,
    max_size_bytes: Option<u64>,
}

impl DocumentSchema {
    /// A required document accepting images and PDFs, with no rules
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            required: true,
            rules: Vec::new(),
            must_match: Vec::new(),
            accepted_formats: vec![MimeKind::Image, MimeKind::Pdf],
            max_size_bytes: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn pattern(mut self, field: &str, pattern: &Lazy<Regex>) -> Self {
        self.rules.push(ExtractedFieldRule {
            field: field.to_string(),
            rule: FieldRule::Pattern(Regex::clone(pattern)),
        });
        self
    }

    pub fn future(mut self, field: &str) -> Self {
        self.rules.push(ExtractedFieldRule {
            field: field.to_string(),
            rule: FieldRule::Future,
        });
        self
    }

    pub fn recent(mut self, field: &str, months: u32) -> Self {
        self.rules.push(ExtractedFieldRule {
            field: field.to_string(),
            rule: FieldRule::Recent { months },
        });
        self
    }

    pub fn must_match(mut self, extracted_field: &str, form_field: &str, normalization: Normalization) -> Self {
        self.must_match.push(MustMatch {
            extracted_field: extracted_field.to_string(),
            form_field: form_field.to_string(),
            normalization,
        });
        self
    }

    pub fn accepts(mut self, formats: &[MimeKind]) -> Self {
        self.accepted_formats = formats.to_vec();
        self
    }

    pub fn max_size_bytes(mut self, limit: u64) -> Self {
        self.max_size_bytes = Some(limit);
        self
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn rules(&self) -> &[ExtractedFieldRule] {
        &self.rules
    }

    pub fn must_match_pairs(&self) -> &[MustMatch] {
        &self.must_match
    }

    pub fn accepted_formats(&self) -> &[MimeKind] {
        &self.accepted_formats
    }

    pub fn size_limit(&self) -> Option<u64> {
        self.max_size_bytes
    }

    /// Checks the captured file against the accepted formats and size limit
    pub fn check_capture(&self, capture: &CapturedDocument) -> Result<(), DocumentError> {
        if !self.accepted_formats.contains(&capture.mime_kind) {
            return Err(DocumentError::UnsupportedFormat {
                document_type: self.document_type,
                mime_kind: capture.mime_kind,
            });
        }
        if let Some(limit) = self.max_size_bytes {
            if capture.size_bytes > limit {
                return Err(DocumentError::FileTooLarge {
                    document_type: self.document_type,
                    size_bytes: capture.size_bytes,
                    limit_bytes: limit,
                });
            }
        }
        Ok(())
    }

    /// Returns true if any must-match pair reads `form_field`
    pub fn depends_on(&self, form_field: &str) -> bool {
        self.must_match.iter().any(|m| m.form_field == form_field)
    }
}
