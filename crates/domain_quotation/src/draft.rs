//! Quotation Draft Aggregate Root
//!
//! The in-progress quotation: declared form values, one record per document
//! type, the current premium, the step position and the error map. It is
//! owned by exactly one [`QuotationWorkflow`](crate::QuotationWorkflow) and
//! changed only through it.
//!
//! # Invariants
//!
//! - `highest_reached >= step_index`
//! - The premium, when present, was computed from the current rating-relevant
//!   values
//! - At most one submission is in flight

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use core_kernel::{QuotationId, SubmissionId};
use domain_documents::{parse_document_date, DeclaredFields, DocumentRecord, DocumentType};
use domain_rating::{
    CoverageSelection, DriverProfile, PremiumBreakdown, ProductCode, RatingError, RatingHistory,
    RatingInput, RatingRequest, UnderwriterId, UsageType, VehicleCategory, VehicleProfile,
};

use crate::error::StepError;
use crate::events::QuotationEvent;
use crate::fields::{parse_amount, parse_yes_no, ErrorKey, FormField};
use crate::payment::{PaymentMethod, PaymentSelection};
use crate::rules::read;
use crate::submission::{DocumentSummary, ProposerDetails, SubmissionReceipt};

#[derive(Debug, Clone)]
pub struct QuotationDraft {
    id: QuotationId,
    form: BTreeMap<FormField, String>,
    documents: BTreeMap<DocumentType, DocumentRecord>,
    premium: Option<PremiumBreakdown>,
    /// 1-based
    step_index: usize,
    highest_reached: usize,
    errors: BTreeMap<ErrorKey, String>,
    submitting: Option<SubmissionId>,
    receipt: Option<SubmissionReceipt>,
    events: Vec<QuotationEvent>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuotationDraft {
    /// A fresh draft on step 1 with a pending record per document
    pub(crate) fn new(documents: impl IntoIterator<Item = DocumentRecord>, now: DateTime<Utc>) -> Self {
        let id = QuotationId::new_v7();
        Self {
            id,
            form: BTreeMap::new(),
            documents: documents
                .into_iter()
                .map(|record| (record.document_type(), record))
                .collect(),
            premium: None,
            step_index: 1,
            highest_reached: 1,
            errors: BTreeMap::new(),
            submitting: None,
            receipt: None,
            events: vec![QuotationEvent::QuotationStarted {
                quotation_id: id,
                timestamp: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> QuotationId {
        self.id
    }

    pub fn values(&self) -> &BTreeMap<FormField, String> {
        &self.form
    }

    /// The trimmed, non-empty value of `field`
    pub fn value(&self, field: FormField) -> Option<&str> {
        read(&self.form, field)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.documents.values()
    }

    pub fn document(&self, document_type: DocumentType) -> Option<&DocumentRecord> {
        self.documents.get(&document_type)
    }

    pub fn premium(&self) -> Option<&PremiumBreakdown> {
        self.premium.as_ref()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// The highest step ever validly reached
    pub fn highest_reached(&self) -> usize {
        self.highest_reached
    }

    pub fn errors(&self) -> &BTreeMap<ErrorKey, String> {
        &self.errors
    }

    pub fn error(&self, key: ErrorKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn submission_id(&self) -> Option<SubmissionId> {
        self.submitting
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<QuotationEvent> {
        std::mem::take(&mut self.events)
    }

    /// The selected cover, if the cover type parses
    pub fn product(&self) -> Option<ProductCode> {
        self.value(FormField::CoverType).and_then(|v| v.parse().ok())
    }

    /// The cover start date, if it parses
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.value(FormField::StartDate).and_then(parse_document_date)
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// Builds the rating request from the declared values
    ///
    /// # Arguments
    ///
    /// * `rated_on` - Today's date in the jurisdiction
    /// * `underwriter` - Rate with this underwriter instead of the selected one
    ///
    /// # Errors
    ///
    /// `InvalidRequest` naming the first missing or unreadable input
    pub fn rating_request(
        &self,
        rated_on: NaiveDate,
        underwriter: Option<UnderwriterId>,
    ) -> Result<RatingRequest, RatingError> {
        let product: ProductCode = self.required(FormField::CoverType, RatingInput::Product)?.parse()?;
        let underwriter = match underwriter {
            Some(underwriter) => underwriter,
            None => UnderwriterId::new(self.required(FormField::Insurer, RatingInput::Underwriter)?),
        };

        let declared_value = parse_amount(self.required(FormField::VehicleValue, RatingInput::DeclaredValue)?)
            .ok_or_else(|| RatingError::invalid(RatingInput::DeclaredValue, "Vehicle value must be a number"))?;
        let year_of_manufacture = self
            .required(FormField::YearOfManufacture, RatingInput::YearOfManufacture)?
            .parse::<i32>()
            .map_err(|_| RatingError::invalid(RatingInput::YearOfManufacture, "Enter a four-digit year"))?;
        let engine_capacity_cc = self
            .value(FormField::EngineCapacity)
            .map(|v| {
                v.replace(',', "").parse::<u32>().map_err(|_| {
                    RatingError::invalid(RatingInput::EngineCapacity, "Engine capacity must be a whole number of cc")
                })
            })
            .transpose()?;
        let usage: UsageType = self.required(FormField::UsageType, RatingInput::UsageType)?.parse()?;
        let category: VehicleCategory = self
            .required(FormField::VehicleCategory, RatingInput::VehicleCategory)?
            .parse()?;

        let duration_months = self
            .required(FormField::InsuranceDuration, RatingInput::Duration)?
            .parse::<u32>()
            .map_err(|_| RatingError::invalid(RatingInput::Duration, "Duration must be a whole number of months"))?;
        let start_date = parse_document_date(self.required(FormField::StartDate, RatingInput::StartDate)?)
            .ok_or_else(|| RatingError::invalid(RatingInput::StartDate, "Cover start date must be a valid date"))?;

        let driver = match self.value(FormField::DateOfBirth) {
            Some(value) => {
                let born = parse_document_date(value)
                    .ok_or_else(|| RatingError::invalid(RatingInput::DriverAge, "Date of birth must be a valid date"))?;
                let driver = DriverProfile::from_date_of_birth(born, rated_on);
                let years_licensed = self
                    .value(FormField::YearsLicensed)
                    .map(|v| {
                        v.parse::<u32>().map_err(|_| {
                            RatingError::invalid(RatingInput::YearsLicensed, "Years licensed must be a whole number")
                        })
                    })
                    .transpose()?;
                Some(match years_licensed {
                    Some(years) => driver.with_years_licensed(years),
                    None => driver,
                })
            }
            None => None,
        };

        let prior_claims = self.value(FormField::ClaimsHistory).and_then(parse_yes_no);
        let modified = self.value(FormField::Modifications).and_then(parse_yes_no);
        let history = (prior_claims.is_some() || modified.is_some()).then(|| RatingHistory {
            prior_claims: prior_claims.unwrap_or(false),
            modified: modified.unwrap_or(false),
        });

        Ok(RatingRequest {
            vehicle: VehicleProfile {
                registration: self.text(FormField::RegistrationNumber),
                make: self.text(FormField::Make),
                model: self.text(FormField::Model),
                year_of_manufacture,
                engine_capacity_cc,
                declared_value,
                usage,
                category,
            },
            driver,
            coverage: CoverageSelection {
                product,
                underwriter,
                duration_months,
                start_date,
            },
            history,
            rated_on,
        })
    }

    /// The payment selection, if a valid method is chosen
    pub fn payment_selection(&self) -> Option<PaymentSelection> {
        let method: PaymentMethod = self.value(FormField::PaymentMethod)?.parse().ok()?;
        let phone = if method.requires_phone() {
            self.value(FormField::PaymentPhone).map(str::to_string)
        } else {
            None
        };
        Some(PaymentSelection { method, phone })
    }

    pub fn proposer(&self) -> ProposerDetails {
        ProposerDetails {
            full_name: self.text(FormField::OwnerName),
            id_number: self.text(FormField::OwnerIdNumber),
            phone: self.text(FormField::OwnerPhone),
            email: self.text(FormField::OwnerEmail),
            kra_pin: self.value(FormField::KraPin).map(str::to_string),
        }
    }

    /// Metadata of every document that has been uploaded
    pub fn document_summaries(&self) -> Vec<DocumentSummary> {
        self.documents
            .values()
            .filter(|record| record.upload_id().is_some())
            .map(|record| DocumentSummary {
                document_type: record.document_type(),
                status: record.status(),
                upload_id: record.upload_id(),
                raw_ref: record.capture().map(|c| c.raw_ref.clone()),
                confidence: record.confidence(),
            })
            .collect()
    }

    fn required(&self, field: FormField, input: RatingInput) -> Result<&str, RatingError> {
        self.value(field)
            .ok_or_else(|| RatingError::invalid(input, format!("{} is required", field.label())))
    }

    fn text(&self, field: FormField) -> String {
        self.value(field).unwrap_or_default().to_string()
    }

    // ========================================================================
    // Mutations (workflow only)
    // ========================================================================

    pub(crate) fn set_value(&mut self, field: FormField, value: String, now: DateTime<Utc>) {
        self.form.insert(field, value);
        self.updated_at = now;
    }

    /// Drops the premium; returns true if one was held
    pub(crate) fn invalidate_premium(&mut self) -> bool {
        self.premium.take().is_some()
    }

    pub(crate) fn set_premium(&mut self, premium: Option<PremiumBreakdown>) {
        self.premium = premium;
    }

    pub(crate) fn move_to(&mut self, step_index: usize, now: DateTime<Utc>) {
        self.step_index = step_index;
        self.highest_reached = self.highest_reached.max(step_index);
        self.updated_at = now;
    }

    pub(crate) fn replace_errors(&mut self, errors: &[StepError]) {
        self.errors = errors
            .iter()
            .map(|e| (e.key, e.message.clone()))
            .collect();
    }

    pub(crate) fn clear_error(&mut self, key: ErrorKey) {
        self.errors.remove(&key);
    }

    pub(crate) fn set_error(&mut self, key: ErrorKey, message: impl Into<String>) {
        self.errors.insert(key, message.into());
    }

    pub(crate) fn document_mut(&mut self, document_type: DocumentType) -> Option<&mut DocumentRecord> {
        self.documents.get_mut(&document_type)
    }

    pub(crate) fn put_document(&mut self, record: DocumentRecord) {
        self.documents.insert(record.document_type(), record);
    }

    pub(crate) fn start_submission(&mut self, submission_id: SubmissionId) {
        self.submitting = Some(submission_id);
    }

    pub(crate) fn finish_submission(&mut self, receipt: Option<SubmissionReceipt>) {
        self.submitting = None;
        if receipt.is_some() {
            self.receipt = receipt;
        }
    }

    pub(crate) fn record(&mut self, event: QuotationEvent) {
        self.events.push(event);
    }

    /// Clears everything the proposer declared or uploaded
    pub(crate) fn discard(&mut self, now: DateTime<Utc>) {
        self.form.clear();
        self.documents.clear();
        self.premium = None;
        self.errors.clear();
        self.submitting = None;
        self.updated_at = now;
    }
}

impl DeclaredFields for QuotationDraft {
    fn declared_value(&self, form_field: &str) -> Option<String> {
        let field: FormField = form_field.parse().ok()?;
        self.value(field).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(values: &[(FormField, &str)]) -> QuotationDraft {
        let now = Utc::now();
        let mut draft = QuotationDraft::new(Vec::new(), now);
        for (field, value) in values {
            draft.set_value(*field, value.to_string(), now);
        }
        draft
    }

    fn rated_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn vehicle_values() -> Vec<(FormField, &'static str)> {
        vec![
            (FormField::CoverType, "tor"),
            (FormField::Insurer, "sanlam"),
            (FormField::VehicleValue, "2,000,000"),
            (FormField::YearOfManufacture, "2020"),
            (FormField::EngineCapacity, "1500"),
            (FormField::UsageType, "private"),
            (FormField::VehicleCategory, "private_car"),
            (FormField::InsuranceDuration, "12"),
            (FormField::StartDate, "2025-07-20"),
        ]
    }

    #[test]
    fn test_rating_request_from_form() {
        let mut values = vehicle_values();
        values.push((FormField::DateOfBirth, "1990-03-15"));
        values.push((FormField::ClaimsHistory, "yes"));
        let request = draft(&values).rating_request(rated_on(), None).unwrap();

        assert_eq!(request.vehicle.declared_value, dec!(2000000));
        assert_eq!(request.vehicle.engine_capacity_cc, Some(1500));
        assert_eq!(request.coverage.product, ProductCode::TotalOwnRisk);
        assert_eq!(request.coverage.underwriter.as_str(), "sanlam");
        assert_eq!(request.driver.map(|d| d.age), Some(35));
        assert_eq!(
            request.history,
            Some(RatingHistory {
                prior_claims: true,
                modified: false
            })
        );
    }

    #[test]
    fn test_missing_input_names_field() {
        let values: Vec<_> = vehicle_values()
            .into_iter()
            .filter(|(f, _)| *f != FormField::VehicleValue)
            .collect();
        let error = draft(&values).rating_request(rated_on(), None).unwrap_err();
        assert!(matches!(
            error,
            RatingError::InvalidRequest {
                input: RatingInput::DeclaredValue,
                ..
            }
        ));
    }

    #[test]
    fn test_underwriter_override() {
        let values: Vec<_> = vehicle_values()
            .into_iter()
            .filter(|(f, _)| *f != FormField::Insurer)
            .collect();
        let request = draft(&values)
            .rating_request(rated_on(), Some(UnderwriterId::new("madison")))
            .unwrap();
        assert_eq!(request.coverage.underwriter.as_str(), "madison");
    }

    #[test]
    fn test_declared_fields_by_key() {
        let draft = draft(&[(FormField::OwnerName, "  Wanjiku Kamau ")]);
        assert_eq!(draft.declared_value("ownerName"), Some("Wanjiku Kamau".to_string()));
        assert_eq!(draft.declared_value("unknownField"), None);
    }

    #[test]
    fn test_payment_selection() {
        let mpesa = draft(&[(FormField::PaymentMethod, "mpesa"), (FormField::PaymentPhone, "0712345678")]);
        assert_eq!(mpesa.payment_selection().unwrap().phone.as_deref(), Some("0712345678"));

        let card = draft(&[(FormField::PaymentMethod, "card"), (FormField::PaymentPhone, "0712345678")]);
        assert_eq!(card.payment_selection().unwrap().phone, None);
    }
}
