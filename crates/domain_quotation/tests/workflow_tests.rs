//! Integration tests for the quotation workflow
//!
//! Test coverage:
//! - Step navigation: advance, retreat, jump limits
//! - Rating on entry to the premium step, invalidation and recalculation
//! - Document uploads through the intake port, stale and failed results
//! - Cross-field re-validation and autofill from validated documents
//! - Submission preconditions, adapter failures and cancellation
//! - Properties: jump bounds, premium invalidation by field relevance

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{Clock, DomainPort, FixedClock, OperationMetadata, PortError, Timezone};
use domain_documents::{
    CapturedDocument, DocumentError, DocumentIntakePort, DocumentStatus, DocumentType, Extraction,
    MimeKind,
};
use domain_quotation::{
    ErrorKey, FlowState, FormField, PaymentMethod, QuotationEvent, QuotationWorkflow, SubmissionPayload,
    SubmissionPort, SubmissionReceipt, UploadOutcome, WorkflowContext, WorkflowError, WorkflowSettings,
};
use domain_rating::catalog::motor_catalog;
use domain_rating::{RatingError, RatingInput, RatingService, UnderwriterId};

// ============================================================================
// Helpers
// ============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
}

fn context() -> WorkflowContext {
    let rating = RatingService::new(Arc::new(motor_catalog().unwrap()));
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::on_date(today(), Timezone::default()));
    WorkflowContext::new(rating, clock, WorkflowSettings::default())
}

fn fill(workflow: &mut QuotationWorkflow, values: &[(FormField, &str)]) {
    for (field, value) in values {
        workflow.field_changed(*field, *value).unwrap();
    }
}

fn fill_personal(workflow: &mut QuotationWorkflow) {
    fill(
        workflow,
        &[
            (FormField::OwnerName, "Wanjiku Kamau"),
            (FormField::OwnerIdNumber, "12345678"),
            (FormField::OwnerPhone, "0712345678"),
            (FormField::OwnerEmail, "wanjiku@example.co.ke"),
            (FormField::DateOfBirth, "1990-03-15"),
            (FormField::YearsLicensed, "10"),
        ],
    );
}

fn fill_vehicle(workflow: &mut QuotationWorkflow, year: &str) {
    fill(
        workflow,
        &[
            (FormField::VehicleCategory, "private_car"),
            (FormField::CoverType, "tor"),
            (FormField::RegistrationNumber, "KDA 123A"),
            (FormField::Make, "Toyota"),
            (FormField::Model, "Fielder"),
            (FormField::YearOfManufacture, year),
            (FormField::EngineCapacity, "1500"),
            (FormField::VehicleValue, "1,200,000"),
            (FormField::UsageType, "private"),
            (FormField::Insurer, "sanlam"),
            (FormField::InsuranceDuration, "12"),
            (FormField::StartDate, "2025-07-20"),
            (FormField::ClaimsHistory, "no"),
            (FormField::Modifications, "no"),
        ],
    );
}

fn fill_payment(workflow: &mut QuotationWorkflow) {
    fill(
        workflow,
        &[(FormField::PaymentMethod, "mpesa"), (FormField::PaymentPhone, "0712345678")],
    );
}

fn extraction(fields: &[(&str, &str)]) -> Extraction {
    let fields: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Extraction::new(fields, 0.97)
}

fn national_id(full_name: &str) -> Extraction {
    extraction(&[
        ("fullName", full_name),
        ("idNumber", "12345678"),
        ("dateOfBirth", "15/03/1990"),
    ])
}

fn driving_license() -> Extraction {
    extraction(&[
        ("licenseNumber", "DL12345ABC"),
        ("expiryDate", "2027-01-01"),
        ("fullName", "Wanjiku Kamau"),
    ])
}

fn logbook(year: &str) -> Extraction {
    extraction(&[
        ("registrationNumber", "KDA123A"),
        ("chassisNumber", "JT123456789"),
        ("yearOfManufacture", year),
        ("engineCapacity", "1,500"),
    ])
}

fn capture(name: &str) -> CapturedDocument {
    CapturedDocument {
        raw_ref: format!("capture://{}", name),
        mime_kind: MimeKind::Image,
        size_bytes: 350_000,
    }
}

/// Intake adapter returning a canned extraction per document type
struct CannedIntake {
    extractions: BTreeMap<DocumentType, Extraction>,
}

impl CannedIntake {
    fn valid(year: &str) -> Self {
        let extractions = [
            (DocumentType::NationalId, national_id("WANJIKU KAMAU")),
            (DocumentType::DrivingLicense, driving_license()),
            (DocumentType::Logbook, logbook(year)),
        ]
        .into_iter()
        .collect();
        Self { extractions }
    }
}

impl DomainPort for CannedIntake {}

#[async_trait]
impl DocumentIntakePort for CannedIntake {
    async fn extract(
        &self,
        document_type: DocumentType,
        _capture: &CapturedDocument,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Extraction, PortError> {
        self.extractions
            .get(&document_type)
            .cloned()
            .ok_or_else(|| PortError::extraction(format!("no text found on {}", document_type)))
    }
}

/// Submission adapter recording payloads, failing the first `failures` calls
struct RecordingSubmission {
    failures: Mutex<usize>,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingSubmission {
    fn new(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            payloads: Mutex::new(Vec::new()),
        }
    }
}

impl DomainPort for RecordingSubmission {}

#[async_trait]
impl SubmissionPort for RecordingSubmission {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        _metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError> {
        self.payloads.lock().unwrap().push(payload.clone());
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(PortError::connection("gateway unreachable"));
        }
        Ok(SubmissionReceipt {
            reference_id: "MQ-2025-000123".to_string(),
        })
    }
}

async fn upload_all(workflow: &mut QuotationWorkflow, intake: &CannedIntake) {
    for document_type in [DocumentType::NationalId, DocumentType::DrivingLicense, DocumentType::Logbook] {
        let outcome = workflow
            .document_uploaded(document_type, capture(document_type.key()), intake)
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Validated(_)), "{:?}", outcome);
    }
}

/// A workflow on step 4 holding a premium
async fn at_payment_step() -> QuotationWorkflow {
    let mut workflow = QuotationWorkflow::start(context());
    fill_personal(&mut workflow);
    workflow.advance().unwrap();
    fill_vehicle(&mut workflow, "2018");
    workflow.advance().unwrap();
    upload_all(&mut workflow, &CannedIntake::valid("2018")).await;
    workflow.advance().unwrap();
    workflow
}

// ============================================================================
// Navigation
// ============================================================================

mod navigation_tests {
    use super::*;

    /// Verifies a new quotation starts on step 1 with pending documents
    #[test]
    fn test_start_on_first_step() {
        let mut workflow = QuotationWorkflow::start(context());

        assert_eq!(workflow.draft().step_index(), 1);
        assert_eq!(workflow.state(), FlowState::Active);
        assert!(workflow.draft().premium().is_none());
        assert!(workflow
            .draft()
            .documents()
            .all(|record| record.status() == DocumentStatus::Pending));
        assert!(matches!(workflow.take_events()[0], QuotationEvent::QuotationStarted { .. }));
    }

    /// Verifies an incomplete step reports every field and does not move
    #[test]
    fn test_advance_reports_all_errors() {
        let mut workflow = QuotationWorkflow::start(context());
        workflow.field_changed(FormField::OwnerName, "Wanjiku Kamau").unwrap();

        let errors = match workflow.advance() {
            Err(WorkflowError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        };

        let keys: Vec<_> = errors.iter().map(|e| e.key).collect();
        assert!(keys.contains(&ErrorKey::Field(FormField::OwnerIdNumber)));
        assert!(keys.contains(&ErrorKey::Field(FormField::OwnerPhone)));
        assert!(keys.contains(&ErrorKey::Field(FormField::OwnerEmail)));
        assert!(keys.contains(&ErrorKey::Field(FormField::DateOfBirth)));
        assert!(!keys.contains(&ErrorKey::Field(FormField::OwnerName)));

        assert_eq!(workflow.draft().step_index(), 1);
        assert_eq!(
            workflow.draft().error(ErrorKey::Field(FormField::OwnerPhone)),
            Some("Phone number is required")
        );
    }

    /// Verifies a corrected field drops its error
    #[test]
    fn test_field_change_clears_its_error() {
        let mut workflow = QuotationWorkflow::start(context());
        assert!(workflow.advance().is_err());
        assert!(workflow.draft().error(ErrorKey::Field(FormField::OwnerEmail)).is_some());

        workflow.field_changed(FormField::OwnerEmail, "wanjiku@example.co.ke").unwrap();

        assert!(workflow.draft().error(ErrorKey::Field(FormField::OwnerEmail)).is_none());
        assert!(workflow.draft().error(ErrorKey::Field(FormField::OwnerPhone)).is_some());
    }

    /// Verifies an underage proposer cannot leave step 1
    #[test]
    fn test_minimum_age() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.field_changed(FormField::DateOfBirth, "2010-01-01").unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "You must be at least 18 years old");
    }

    /// Verifies whole-number fields reject decimals on the step that owns them
    #[test]
    fn test_whole_number_fields() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.field_changed(FormField::YearsLicensed, "2.5").unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Years licensed must be a whole number");

        workflow.field_changed(FormField::YearsLicensed, "2").unwrap();
        workflow.advance().unwrap();
        fill_vehicle(&mut workflow, "2018");
        workflow.field_changed(FormField::EngineCapacity, "1500.5").unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, ErrorKey::Field(FormField::EngineCapacity));

        workflow.field_changed(FormField::EngineCapacity, "1,500").unwrap();
        workflow.advance().unwrap();
        assert_eq!(workflow.draft().step_index(), 3);
    }

    /// Verifies advancing and retreating, floored at step 1
    #[test]
    fn test_advance_and_retreat() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);

        assert_eq!(workflow.advance().unwrap(), 2);
        assert!(workflow.draft().errors().is_empty());
        assert_eq!(workflow.retreat().unwrap(), 1);
        assert_eq!(workflow.retreat().unwrap(), 1);
        assert_eq!(workflow.draft().highest_reached(), 2);

        let events = workflow.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, QuotationEvent::StepAdvanced { from: 1, to: 2, .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, QuotationEvent::StepRetreated { .. }))
                .count(),
            1
        );
    }

    /// Verifies jumps are limited to the highest step reached
    #[test]
    fn test_jump_limits() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.advance().unwrap();
        workflow.retreat().unwrap();

        assert_eq!(workflow.jump_to(2).unwrap(), 2);
        assert!(matches!(
            workflow.jump_to(3),
            Err(WorkflowError::JumpNotAllowed { requested: 3, highest: 2 })
        ));
        assert!(matches!(workflow.jump_to(0), Err(WorkflowError::JumpNotAllowed { .. })));
        assert_eq!(workflow.jump_to(1).unwrap(), 1);
    }

    /// Verifies the insurer must offer the selected cover
    #[test]
    fn test_insurer_must_offer_cover() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.advance().unwrap();
        fill_vehicle(&mut workflow, "2018");
        workflow.field_changed(FormField::Insurer, "jubilee").unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, ErrorKey::Field(FormField::Insurer));
        assert_eq!(errors[0].message, "The selected insurer does not offer this cover");
        assert_eq!(workflow.draft().step_index(), 2);
    }

    /// Verifies step 3 lists each missing required document
    #[test]
    fn test_documents_required_to_leave_step_three() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.advance().unwrap();
        fill_vehicle(&mut workflow, "2018");
        workflow.advance().unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();
        let keys: Vec<_> = errors.iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                ErrorKey::Document(DocumentType::NationalId),
                ErrorKey::Document(DocumentType::DrivingLicense),
                ErrorKey::Document(DocumentType::Logbook),
            ]
        );
        assert_eq!(errors[2].message, "Vehicle Logbook is required");
    }

    /// Verifies the pre-confirmation step cannot be left by advancing
    #[tokio::test]
    async fn test_advance_from_payment_requires_submission() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);

        assert!(matches!(workflow.advance(), Err(WorkflowError::SubmissionRequired)));
        assert_eq!(workflow.draft().step_index(), 4);
    }
}

// ============================================================================
// Rating
// ============================================================================

mod rating_tests {
    use super::*;

    /// Verifies entering step 4 rates the draft with the selected insurer
    #[tokio::test]
    async fn test_premium_computed_on_entry() {
        let mut workflow = at_payment_step().await;

        let premium = workflow.draft().premium().cloned().unwrap();
        assert_eq!(premium.underwriter_id().as_str(), "sanlam");

        let request = workflow.draft().rating_request(today(), None).unwrap();
        let expected = RatingService::new(Arc::new(motor_catalog().unwrap()))
            .quote(&request)
            .unwrap();
        assert_eq!(premium, expected);

        assert!(workflow
            .take_events()
            .iter()
            .any(|e| matches!(e, QuotationEvent::PremiumComputed { .. })));
    }

    /// Verifies a rating-relevant change drops the premium without recomputing
    #[tokio::test]
    async fn test_relevant_change_invalidates() {
        let mut workflow = at_payment_step().await;
        workflow.take_events();

        workflow.field_changed(FormField::VehicleValue, "1,000,000").unwrap();

        assert!(workflow.draft().premium().is_none());
        let events = workflow.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            QuotationEvent::PremiumInvalidated { field: FormField::VehicleValue, .. }
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, QuotationEvent::PremiumComputed { .. })));
    }

    /// Verifies contact details do not affect the premium
    #[tokio::test]
    async fn test_irrelevant_change_keeps_premium() {
        let mut workflow = at_payment_step().await;

        workflow.field_changed(FormField::OwnerEmail, "kamau@example.co.ke").unwrap();
        workflow.field_changed(FormField::PaymentMethod, "card").unwrap();

        assert!(workflow.draft().premium().is_some());
    }

    /// Verifies recalculation restores a dropped premium
    #[tokio::test]
    async fn test_recalculate() {
        let mut workflow = at_payment_step().await;
        let before = workflow.draft().premium().cloned().unwrap();

        workflow.field_changed(FormField::VehicleValue, "6,000,000").unwrap();
        let after = workflow.recalculate().unwrap();

        assert!(after.total_premium().amount() > before.total_premium().amount());
        assert_eq!(workflow.draft().premium(), Some(&after));
    }

    /// Verifies jumping back onto step 4 re-rates a dropped premium
    #[tokio::test]
    async fn test_jump_rerates() {
        let mut workflow = at_payment_step().await;
        workflow.jump_to(2).unwrap();
        workflow.field_changed(FormField::InsuranceDuration, "6").unwrap();
        assert!(workflow.draft().premium().is_none());

        workflow.jump_to(4).unwrap();

        assert!(workflow.draft().premium().is_some());
    }

    /// Verifies rating input errors land on the field they came from
    #[tokio::test]
    async fn test_rating_error_attached_to_field() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.advance().unwrap();
        fill_vehicle(&mut workflow, "2008");
        workflow.advance().unwrap();
        upload_all(&mut workflow, &CannedIntake::valid("2008")).await;

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, ErrorKey::Field(FormField::YearOfManufacture));
        assert_eq!(
            errors[0].message,
            "Sanlam General Insurance does not cover vehicles older than 15 years"
        );
        assert_eq!(workflow.draft().step_index(), 3);
        assert!(workflow.draft().premium().is_none());
    }

    /// Verifies a missing rate table surfaces at form level only
    #[test]
    fn test_configuration_error_is_form_level() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        fill_vehicle(&mut workflow, "2018");
        workflow.field_changed(FormField::Insurer, "jubilee").unwrap();

        let error = workflow.recalculate().unwrap_err();

        assert!(matches!(error, WorkflowError::Rating(RatingError::Configuration(_))));
        assert!(workflow.draft().error(ErrorKey::Form).is_some());
        assert!(workflow.draft().error(ErrorKey::Field(FormField::Insurer)).is_none());
    }

    /// Verifies a missing input is reported against its field
    #[test]
    fn test_recalculate_missing_input() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_vehicle(&mut workflow, "2018");
        workflow.field_changed(FormField::VehicleValue, "").unwrap();

        match workflow.recalculate() {
            Err(WorkflowError::Rating(RatingError::InvalidRequest { input, .. })) => {
                assert_eq!(input, RatingInput::DeclaredValue);
            }
            other => panic!("expected invalid request, got {:?}", other),
        }
        assert_eq!(
            workflow.draft().error(ErrorKey::Field(FormField::VehicleValue)),
            Some("Vehicle value is required")
        );
    }

    /// Verifies an out-of-range typed year is returned as an invalid request
    #[tokio::test]
    async fn test_recalculate_extreme_year() {
        let mut workflow = at_payment_step().await;

        for year in ["-2147483648", "2147483647", "1949"] {
            workflow.field_changed(FormField::YearOfManufacture, year).unwrap();

            match workflow.recalculate() {
                Err(WorkflowError::Rating(RatingError::InvalidRequest { input, .. })) => {
                    assert_eq!(input, RatingInput::YearOfManufacture, "{}", year);
                }
                other => panic!("expected invalid request for {}, got {:?}", year, other),
            }
            assert!(workflow.draft().error(ErrorKey::Field(FormField::YearOfManufacture)).is_some());
            assert!(workflow.draft().premium().is_none());
        }

        let quotes = workflow.compare_available().unwrap();
        assert!(quotes
            .iter()
            .all(|q| matches!(q.result, Err(RatingError::InvalidRequest { input: RatingInput::YearOfManufacture, .. }))));
    }

    /// Verifies fractional years licensed is reported, not dropped
    #[test]
    fn test_fractional_years_licensed() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        fill_vehicle(&mut workflow, "2018");
        workflow.field_changed(FormField::YearsLicensed, "2.5").unwrap();

        match workflow.recalculate() {
            Err(WorkflowError::Rating(RatingError::InvalidRequest { input, .. })) => {
                assert_eq!(input, RatingInput::YearsLicensed);
            }
            other => panic!("expected invalid request, got {:?}", other),
        }
        assert_eq!(
            workflow.draft().error(ErrorKey::Field(FormField::YearsLicensed)),
            Some("Years licensed must be a whole number")
        );
    }

    /// Verifies comparison rates every offering underwriter in registry order
    #[test]
    fn test_compare_available() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        fill_vehicle(&mut workflow, "2018");

        let offered: Vec<_> = workflow
            .available_underwriters()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        let quotes = workflow.compare_available().unwrap();

        assert_eq!(quotes.len(), offered.len());
        assert!(quotes.len() >= 2);
        for (quote, id) in quotes.iter().zip(&offered) {
            assert_eq!(&quote.underwriter_id, id);
            assert!(quote.result.is_ok());
        }
        assert!(workflow.draft().premium().is_none());
    }

    /// Verifies an unknown candidate is reported without hiding the others
    #[test]
    fn test_compare_with_unknown_candidate() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        fill_vehicle(&mut workflow, "2018");

        let quotes = workflow
            .compare_underwriters(&[UnderwriterId::new("madison"), UnderwriterId::new("jubilee")])
            .unwrap();

        assert!(quotes[0].result.is_ok());
        assert!(matches!(quotes[1].result, Err(RatingError::Configuration(_))));
        assert!(workflow.compare_underwriters(&[]).unwrap().is_empty());
    }
}

// ============================================================================
// Documents
// ============================================================================

mod document_tests {
    use super::*;

    /// Verifies a valuation report is not requested for total-own-risk cover
    #[test]
    fn test_valuation_report_not_requested() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_vehicle(&mut workflow, "2018");

        let result = workflow.begin_document_upload(DocumentType::ValuationReport, capture("valuation"));

        assert!(matches!(
            result,
            Err(WorkflowError::Document(DocumentError::NotRequested(DocumentType::ValuationReport)))
        ));
    }

    /// Verifies comprehensive cover requests a valuation report
    #[test]
    fn test_comprehensive_requests_valuation() {
        let mut workflow = QuotationWorkflow::start(context());
        workflow.field_changed(FormField::CoverType, "comprehensive").unwrap();

        let requested: Vec<_> = workflow
            .requested_documents()
            .iter()
            .map(|s| s.document_type())
            .collect();

        assert!(requested.contains(&DocumentType::ValuationReport));
    }

    /// Verifies an oversized file is refused and the record left untouched
    #[test]
    fn test_oversized_upload_rejected() {
        let mut workflow = QuotationWorkflow::start(context());
        let oversized = CapturedDocument {
            size_bytes: 6 * 1024 * 1024,
            ..capture("id")
        };

        let result = workflow.begin_document_upload(DocumentType::NationalId, oversized);

        assert!(matches!(
            result,
            Err(WorkflowError::Document(DocumentError::FileTooLarge { .. }))
        ));
        assert_eq!(
            workflow.draft().document(DocumentType::NationalId).unwrap().status(),
            DocumentStatus::Pending
        );
    }

    /// Verifies a matching extraction validates the document
    #[tokio::test]
    async fn test_upload_validates() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);

        let outcome = workflow
            .document_uploaded(DocumentType::NationalId, capture("id"), &CannedIntake::valid("2018"))
            .await
            .unwrap();

        assert!(matches!(outcome, UploadOutcome::Validated(_)));
        let record = workflow.draft().document(DocumentType::NationalId).unwrap();
        assert_eq!(record.status(), DocumentStatus::Validated);
        assert_eq!(record.confidence(), Some(0.97));
    }

    /// Verifies a mismatch fails the document and re-validates once corrected
    #[tokio::test]
    async fn test_mismatch_then_correction() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        let ticket = workflow
            .begin_document_upload(DocumentType::NationalId, capture("id"))
            .unwrap();

        let outcome = workflow.complete_document_upload(ticket, Ok(national_id("Otieno Odhiambo")));

        match outcome {
            UploadOutcome::ValidationFailed(result) => {
                assert_eq!(result.errors, vec!["Document data does not match form ownerName"]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }

        workflow.field_changed(FormField::OwnerName, "Otieno Odhiambo").unwrap();

        assert_eq!(
            workflow.draft().document(DocumentType::NationalId).unwrap().status(),
            DocumentStatus::Validated
        );
    }

    /// Verifies a failed document blocks step 3 with its first error
    #[tokio::test]
    async fn test_failed_document_blocks_step() {
        let mut workflow = QuotationWorkflow::start(context());
        fill_personal(&mut workflow);
        workflow.advance().unwrap();
        fill_vehicle(&mut workflow, "2018");
        workflow.advance().unwrap();
        upload_all(&mut workflow, &CannedIntake::valid("2018")).await;
        workflow.field_changed(FormField::RegistrationNumber, "KCB 456Z").unwrap();

        let errors = workflow.advance().unwrap_err().step_errors().to_vec();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key, ErrorKey::Document(DocumentType::Logbook));
        assert_eq!(
            errors[0].message,
            "Vehicle Logbook: Document data does not match form registrationNumber"
        );
    }

    /// Verifies a result for a replaced upload is discarded
    #[test]
    fn test_stale_result_discarded() {
        let mut workflow = QuotationWorkflow::start(context());
        let first = workflow
            .begin_document_upload(DocumentType::DrivingLicense, capture("dl-1"))
            .unwrap();
        let second = workflow
            .begin_document_upload(DocumentType::DrivingLicense, capture("dl-2"))
            .unwrap();

        let outcome = workflow.complete_document_upload(first, Ok(driving_license()));
        assert_eq!(outcome, UploadOutcome::Discarded);
        let record = workflow.draft().document(DocumentType::DrivingLicense).unwrap();
        assert_eq!(record.status(), DocumentStatus::Processing);
        assert_eq!(record.upload_id(), Some(second.upload_id));

        let outcome = workflow.complete_document_upload(second, Ok(driving_license()));
        assert!(matches!(outcome, UploadOutcome::Validated(_)));
    }

    /// Verifies an adapter failure marks the upload as failed
    #[tokio::test]
    async fn test_extraction_failure() {
        let mut workflow = QuotationWorkflow::start(context());
        let intake = CannedIntake {
            extractions: BTreeMap::new(),
        };

        let outcome = workflow
            .document_uploaded(DocumentType::Logbook, capture("logbook"), &intake)
            .await
            .unwrap();

        match outcome {
            UploadOutcome::UploadFailed { kind, .. } => assert_eq!(kind, "extraction"),
            other => panic!("expected upload failure, got {:?}", other),
        }
        assert_eq!(
            workflow.draft().document(DocumentType::Logbook).unwrap().status(),
            DocumentStatus::UploadFailed
        );
        assert!(workflow
            .take_events()
            .iter()
            .any(|e| matches!(e, QuotationEvent::DocumentUploadFailed { .. })));
    }

    /// Verifies empty declared fields are filled from a validated logbook
    #[test]
    fn test_autofill_from_logbook() {
        let mut workflow = QuotationWorkflow::start(context());
        workflow.field_changed(FormField::EngineCapacity, "1800").unwrap();
        let ticket = workflow
            .begin_document_upload(DocumentType::Logbook, capture("logbook"))
            .unwrap();

        let outcome = workflow.complete_document_upload(
            ticket,
            Ok(extraction(&[
                ("registrationNumber", "KDA 123A"),
                ("chassisNumber", "JT123456789"),
                ("yearOfManufacture", "2018"),
                ("engineCapacity", "1500"),
            ])),
        );

        assert!(matches!(outcome, UploadOutcome::ValidationFailed(_)));
        assert_eq!(workflow.draft().value(FormField::RegistrationNumber), None);

        workflow.field_changed(FormField::EngineCapacity, "").unwrap();
        let ticket = workflow
            .begin_document_upload(DocumentType::Logbook, capture("logbook-2"))
            .unwrap();
        let outcome = workflow.complete_document_upload(ticket, Ok(logbook("2018")));

        assert!(matches!(outcome, UploadOutcome::Validated(_)));
        assert_eq!(workflow.draft().value(FormField::RegistrationNumber), Some("KDA123A"));
        assert_eq!(workflow.draft().value(FormField::YearOfManufacture), Some("2018"));
        assert_eq!(
            workflow
                .take_events()
                .iter()
                .filter(|e| matches!(e, QuotationEvent::FieldAutofilled { .. }))
                .count(),
            3
        );
    }

    /// Verifies typed values are never overwritten by autofill
    #[test]
    fn test_autofill_keeps_typed_values() {
        let mut workflow = QuotationWorkflow::start(context());
        workflow.field_changed(FormField::OwnerName, "Wanjiku Kamau").unwrap();
        let ticket = workflow
            .begin_document_upload(DocumentType::NationalId, capture("id"))
            .unwrap();

        workflow.complete_document_upload(ticket, Ok(national_id("WANJIKU  KAMAU")));

        assert_eq!(workflow.draft().value(FormField::OwnerName), Some("Wanjiku Kamau"));
        assert_eq!(workflow.draft().value(FormField::OwnerIdNumber), Some("12345678"));
    }

    /// Verifies autofill can be switched off
    #[test]
    fn test_autofill_disabled() {
        let settings = WorkflowSettings {
            autofill_declared_fields: false,
            ..WorkflowSettings::default()
        };
        let base = context();
        let context = WorkflowContext::new(base.rating.clone(), base.clock.clone(), settings);
        let mut workflow = QuotationWorkflow::start(context);
        let ticket = workflow
            .begin_document_upload(DocumentType::Logbook, capture("logbook"))
            .unwrap();

        workflow.complete_document_upload(ticket, Ok(logbook("2018")));

        assert_eq!(workflow.draft().value(FormField::RegistrationNumber), None);
    }

    /// Verifies results arriving after cancellation are discarded
    #[test]
    fn test_result_after_cancel_discarded() {
        let mut workflow = QuotationWorkflow::start(context());
        let ticket = workflow
            .begin_document_upload(DocumentType::Logbook, capture("logbook"))
            .unwrap();
        workflow.cancel().unwrap();

        let outcome = workflow.complete_document_upload(ticket, Ok(logbook("2018")));

        assert_eq!(outcome, UploadOutcome::Discarded);
        assert!(workflow.draft().values().is_empty());
    }
}

// ============================================================================
// Submission
// ============================================================================

mod submission_tests {
    use super::*;

    /// Verifies a successful submission completes the flow
    #[tokio::test]
    async fn test_submit_completes_flow() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);
        let port = RecordingSubmission::new(0);

        let receipt = workflow.submit(&port).await.unwrap();

        assert_eq!(receipt.reference_id, "MQ-2025-000123");
        assert_eq!(workflow.state(), FlowState::Completed);
        assert_eq!(workflow.draft().step_index(), 5);
        assert_eq!(workflow.draft().receipt(), Some(&receipt));

        let payloads = port.payloads.lock().unwrap();
        let payload = &payloads[0];
        assert_eq!(payload.quotation_id, workflow.draft().id());
        assert_eq!(payload.proposer.full_name, "Wanjiku Kamau");
        assert_eq!(payload.payment.method, PaymentMethod::Mpesa);
        assert_eq!(payload.payment.phone.as_deref(), Some("0712345678"));
        assert_eq!(payload.documents.len(), 3);
        assert_eq!(Some(&payload.premium), workflow.draft().premium());
        assert!(payload.to_json().unwrap().contains("\"quotationId\""));
    }

    /// Verifies nothing is editable after completion
    #[tokio::test]
    async fn test_completed_flow_is_closed() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);
        workflow.submit(&RecordingSubmission::new(0)).await.unwrap();

        assert!(matches!(workflow.advance(), Err(WorkflowError::FlowCompleted)));
        assert!(matches!(
            workflow.field_changed(FormField::Make, "Mazda"),
            Err(WorkflowError::FlowCompleted)
        ));
        assert!(matches!(workflow.cancel(), Err(WorkflowError::FlowCompleted)));
    }

    /// Verifies submission is only possible from step 4
    #[test]
    fn test_submit_from_wrong_step() {
        let mut workflow = QuotationWorkflow::start(context());

        match workflow.begin_submission() {
            Err(WorkflowError::NotReadyForSubmission(reasons)) => {
                assert_eq!(reasons, vec!["Quotation can only be submitted from step 4"]);
            }
            other => panic!("expected not ready, got {:?}", other),
        }
        assert!(!workflow.draft().is_submitting());
    }

    /// Verifies the payment phone is required for M-Pesa
    #[tokio::test]
    async fn test_mpesa_requires_phone() {
        let mut workflow = at_payment_step().await;
        workflow.field_changed(FormField::PaymentMethod, "mpesa").unwrap();

        match workflow.begin_submission() {
            Err(WorkflowError::NotReadyForSubmission(reasons)) => {
                assert_eq!(reasons, vec!["M-Pesa phone number is required"]);
            }
            other => panic!("expected not ready, got {:?}", other),
        }

        workflow.field_changed(FormField::PaymentMethod, "card").unwrap();
        assert!(workflow.begin_submission().is_ok());
    }

    /// Verifies a dropped premium blocks submission
    #[tokio::test]
    async fn test_premium_required() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);
        workflow.field_changed(FormField::UsageType, "business").unwrap();

        match workflow.begin_submission() {
            Err(WorkflowError::NotReadyForSubmission(reasons)) => {
                assert!(reasons.contains(&"Premium has not been calculated".to_string()));
            }
            other => panic!("expected not ready, got {:?}", other),
        }

        workflow.recalculate().unwrap();
        assert!(workflow.begin_submission().is_ok());
    }

    /// Verifies the draft is frozen while a submission is in flight
    #[tokio::test]
    async fn test_single_submission_in_flight() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);

        workflow.begin_submission().unwrap();

        assert!(matches!(workflow.begin_submission(), Err(WorkflowError::SubmissionInFlight)));
        assert!(matches!(workflow.retreat(), Err(WorkflowError::SubmissionInFlight)));
        assert!(matches!(
            workflow.field_changed(FormField::VehicleValue, "900000"),
            Err(WorkflowError::SubmissionInFlight)
        ));
    }

    /// Verifies a transport failure leaves the draft on step 4 for a retry
    #[tokio::test]
    async fn test_failure_then_retry() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);
        workflow.take_events();
        let port = RecordingSubmission::new(1);

        let error = workflow.submit(&port).await.unwrap_err();

        assert!(matches!(error, WorkflowError::Adapter(PortError::Connection { .. })));
        assert!(!workflow.draft().is_submitting());
        assert_eq!(workflow.draft().step_index(), 4);
        assert_eq!(workflow.state(), FlowState::Active);
        assert_eq!(
            workflow.draft().error(ErrorKey::Form),
            Some("Submission failed: Connection error: gateway unreachable")
        );
        assert!(workflow.take_events().iter().any(|e| matches!(
            e,
            QuotationEvent::SubmissionFailed { failure_kind, .. } if failure_kind == "network"
        )));

        let receipt = workflow.submit(&port).await.unwrap();
        assert_eq!(receipt.reference_id, "MQ-2025-000123");
        assert!(workflow.draft().error(ErrorKey::Form).is_none());

        let payloads = port.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 2);
        assert_ne!(payloads[0].submission_id, payloads[1].submission_id);
    }

    /// Verifies a result arriving after cancellation is discarded
    #[tokio::test]
    async fn test_cancel_while_submitting() {
        let mut workflow = at_payment_step().await;
        fill_payment(&mut workflow);
        workflow.begin_submission().unwrap();

        workflow.cancel().unwrap();
        let outcome = workflow.complete_submission(Ok(SubmissionReceipt {
            reference_id: "MQ-late".to_string(),
        }));

        assert!(matches!(outcome, Err(WorkflowError::FlowCancelled)));
        assert_eq!(workflow.state(), FlowState::Cancelled);
        assert!(workflow.draft().receipt().is_none());
        assert!(workflow.draft().values().is_empty());
        assert!(workflow.draft().premium().is_none());
    }

    /// Verifies a result without a pending submission is refused
    #[test]
    fn test_complete_without_submission() {
        let mut workflow = QuotationWorkflow::start(context());

        let outcome = workflow.complete_submission(Ok(SubmissionReceipt {
            reference_id: "MQ-1".to_string(),
        }));

        assert!(matches!(outcome, Err(WorkflowError::NotReadyForSubmission(_))));
    }

    /// Verifies cancelling twice is harmless
    #[test]
    fn test_cancel_idempotent() {
        let mut workflow = QuotationWorkflow::start(context());
        workflow.cancel().unwrap();
        workflow.cancel().unwrap();

        assert!(matches!(workflow.advance(), Err(WorkflowError::FlowCancelled)));
        assert_eq!(
            workflow
                .take_events()
                .iter()
                .filter(|e| matches!(e, QuotationEvent::QuotationCancelled { .. }))
                .count(),
            1
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

mod workflow_properties {
    use super::*;

    proptest! {
        /// Verifies jumps succeed exactly within [1, highest reached]
        #[test]
        fn prop_jump_within_reached_steps(step in 0usize..8) {
            let mut workflow = QuotationWorkflow::start(context());
            fill_personal(&mut workflow);
            workflow.advance().unwrap();
            fill_vehicle(&mut workflow, "2018");
            workflow.advance().unwrap();

            let result = workflow.jump_to(step);

            if (1..=3).contains(&step) {
                prop_assert_eq!(result.unwrap(), step);
                prop_assert_eq!(workflow.draft().step_index(), step);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(workflow.draft().step_index(), 3);
            }
            prop_assert_eq!(workflow.draft().highest_reached(), 3);
        }

        /// Verifies only rating-relevant fields drop the premium
        #[test]
        fn prop_invalidation_follows_relevance(field in prop::sample::select(FormField::ALL.to_vec())) {
            let mut workflow = QuotationWorkflow::start(context());
            fill_personal(&mut workflow);
            fill_vehicle(&mut workflow, "2018");
            workflow.recalculate().unwrap();

            workflow.field_changed(field, "changed").unwrap();

            prop_assert_eq!(workflow.draft().premium().is_none(), field.is_rating_relevant());
        }
    }
}
