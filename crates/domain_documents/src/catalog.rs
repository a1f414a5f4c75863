//! Motor proposal document catalog
//!
//! The schema for each supporting document, and which of them a product
//! requests. Comprehensive cover additionally needs a valuation report.

use std::collections::BTreeMap;

use crate::document::{DocumentType, MimeKind};
use crate::patterns;
use crate::schema::{DocumentSchema, Normalization};

/// Upload size limit applied when none is configured
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Age limit of a valuation report applied when none is configured
pub const DEFAULT_RECENT_MONTHS: u32 = 6;

/// All document schemas known to the quotation flow
#[derive(Debug, Clone)]
pub struct DocumentCatalog {
    schemas: BTreeMap<DocumentType, DocumentSchema>,
}

impl DocumentCatalog {
    /// Builds the motor catalog
    ///
    /// # Arguments
    ///
    /// * `max_upload_bytes` - Largest accepted file for any document
    /// * `recent_months` - How old a valuation report may be
    pub fn motor(max_upload_bytes: u64, recent_months: u32) -> Self {
        let formats = [MimeKind::Image, MimeKind::Pdf];

        let schemas = vec![
            DocumentSchema::new(DocumentType::NationalId)
                .pattern("idNumber", &patterns::NATIONAL_ID_NUMBER)
                .must_match("fullName", "ownerName", Normalization::Text)
                .must_match("idNumber", "ownerIdNumber", Normalization::Identifier)
                .must_match("dateOfBirth", "dateOfBirth", Normalization::Date),
            DocumentSchema::new(DocumentType::DrivingLicense)
                .pattern("licenseNumber", &patterns::DRIVING_LICENSE_NUMBER)
                .future("expiryDate")
                .must_match("fullName", "ownerName", Normalization::Text),
            DocumentSchema::new(DocumentType::Logbook)
                .pattern("registrationNumber", &patterns::REGISTRATION_NUMBER)
                .pattern("chassisNumber", &patterns::CHASSIS_NUMBER)
                .must_match("registrationNumber", "registrationNumber", Normalization::Identifier)
                .must_match("yearOfManufacture", "yearOfManufacture", Normalization::Numeric)
                .must_match("engineCapacity", "engineCapacity", Normalization::Numeric),
            DocumentSchema::new(DocumentType::KraPin)
                .optional()
                .pattern("pinNumber", &patterns::KRA_PIN)
                .must_match("pinNumber", "kraPin", Normalization::Identifier),
            DocumentSchema::new(DocumentType::ValuationReport)
                .recent("valuationDate", recent_months)
                .must_match("registrationNumber", "registrationNumber", Normalization::Identifier),
        ];

        Self::from_schemas(
            schemas
                .into_iter()
                .map(|s| s.accepts(&formats).max_size_bytes(max_upload_bytes)),
        )
    }

    /// Builds a catalog from arbitrary schemas, one per document type
    pub fn from_schemas(schemas: impl IntoIterator<Item = DocumentSchema>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|s| (s.document_type(), s))
                .collect(),
        }
    }

    pub fn schema(&self, document_type: DocumentType) -> Option<&DocumentSchema> {
        self.schemas.get(&document_type)
    }

    /// The documents requested for a cover, in catalog order
    ///
    /// The valuation report is only part of the set when `requires_valuation`
    /// is true.
    pub fn document_set(&self, requires_valuation: bool) -> Vec<&DocumentSchema> {
        self.schemas
            .values()
            .filter(|s| requires_valuation || s.document_type() != DocumentType::ValuationReport)
            .collect()
    }

    /// Document types whose must-match pairs read `form_field`
    pub fn dependents_of(&self, form_field: &str) -> Vec<DocumentType> {
        self.schemas
            .values()
            .filter(|s| s.depends_on(form_field))
            .map(|s| s.document_type())
            .collect()
    }
}

impl Default for DocumentCatalog {
    fn default() -> Self {
        Self::motor(DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_RECENT_MONTHS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valuation_report_only_for_valued_cover() {
        let catalog = DocumentCatalog::default();
        let basic: Vec<_> = catalog.document_set(false).iter().map(|s| s.document_type()).collect();
        assert!(!basic.contains(&DocumentType::ValuationReport));
        assert_eq!(basic.len(), 4);

        let valued = catalog.document_set(true);
        assert_eq!(valued.len(), 5);
    }

    #[test]
    fn test_kra_pin_is_optional() {
        let catalog = DocumentCatalog::default();
        assert!(!catalog.schema(DocumentType::KraPin).unwrap().is_required());
        assert!(catalog.schema(DocumentType::Logbook).unwrap().is_required());
    }

    #[test]
    fn test_dependents_of_form_field() {
        let catalog = DocumentCatalog::default();
        let dependents = catalog.dependents_of("ownerName");
        assert_eq!(dependents, vec![DocumentType::NationalId, DocumentType::DrivingLicense]);
        assert_eq!(
            catalog.dependents_of("registrationNumber"),
            vec![DocumentType::Logbook, DocumentType::ValuationReport]
        );
    }
}
