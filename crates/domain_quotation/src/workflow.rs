//! Quotation Workflow State Machine
//!
//! ```text
//!   1 Personal ──► 2 Vehicle & cover ──► 3 Documents ──► 4 Premium & payment ──► 5 Confirmation
//!        ◄── retreat / jump_to (up to the highest step reached) ──┘      submit ──┘
//! ```
//!
//! # Invariants
//!
//! - `advance` validates the whole current step. On any failure only the
//!   error map changes; the step, the premium and every value are untouched.
//! - Entering a rating-dependent step rates the draft first. Rating input
//!   errors land on the field they came from; rate table configuration errors
//!   are logged and shown once at form level, never on a field.
//! - A change to a rating-relevant field drops the premium. It is recomputed
//!   only on `recalculate` or on reaching the premium step.
//! - Extraction and submission results that arrive for a cancelled flow, or
//!   for an upload that has since been replaced, are discarded.

use std::sync::Arc;

use serde::Serialize;

use core_kernel::{Clock, OperationMetadata, PortError, QuotationId, SubmissionId, UploadId};
use domain_documents::{
    validate_document, CapturedDocument, DocumentCatalog, DocumentError, DocumentIntakePort,
    DocumentRecord, DocumentSchema, DocumentStatus, DocumentType, Extraction, ValidationResult,
};
use domain_rating::{
    PremiumBreakdown, ProductCode, RatingError, RatingInput, RatingService, UnderwriterId,
    UnderwriterQuote, UnderwriterSummary,
};

use crate::draft::QuotationDraft;
use crate::error::{StepError, WorkflowError};
use crate::events::QuotationEvent;
use crate::fields::{ErrorKey, FormField};
use crate::flow::{FlowDefinition, StepKind};
use crate::settings::WorkflowSettings;
use crate::submission::{SubmissionPayload, SubmissionPort, SubmissionReceipt};

const CONFIGURATION_MESSAGE: &str =
    "The selected insurer cannot quote this cover at the moment, please choose another insurer";

/// Lifecycle of the flow as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Active,
    /// Submitted and confirmed
    Completed,
    /// Abandoned; the draft has been discarded
    Cancelled,
}

/// Collaborators shared by every workflow of a process
#[derive(Clone)]
pub struct WorkflowContext {
    pub flow: Arc<FlowDefinition>,
    pub rating: RatingService,
    pub documents: Arc<DocumentCatalog>,
    pub clock: Arc<dyn Clock>,
    pub settings: WorkflowSettings,
}

impl WorkflowContext {
    /// The motor flow and document catalog, configured from `settings`
    pub fn new(rating: RatingService, clock: Arc<dyn Clock>, settings: WorkflowSettings) -> Self {
        let documents = DocumentCatalog::motor(settings.max_upload_bytes, settings.recent_document_months);
        Self {
            flow: Arc::new(FlowDefinition::motor()),
            rating,
            documents: Arc::new(documents),
            clock,
            settings,
        }
    }

    pub fn with_flow(mut self, flow: FlowDefinition) -> Self {
        self.flow = Arc::new(flow);
        self
    }

    pub fn with_documents(mut self, documents: DocumentCatalog) -> Self {
        self.documents = Arc::new(documents);
        self
    }
}

/// Handle for an extraction in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub quotation_id: QuotationId,
    pub document_type: DocumentType,
    pub upload_id: UploadId,
    pub capture: CapturedDocument,
}

/// What became of an extraction result
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Validated(ValidationResult),
    ValidationFailed(ValidationResult),
    /// The adapter failed; the proposer may upload again
    UploadFailed {
        kind: &'static str,
        message: String,
    },
    /// The flow was cancelled or the upload was replaced
    Discarded,
}

/// The state machine driving one quotation
pub struct QuotationWorkflow {
    context: WorkflowContext,
    draft: QuotationDraft,
    state: FlowState,
}

impl QuotationWorkflow {
    /// Starts a new quotation on step 1
    pub fn start(context: WorkflowContext) -> Self {
        let now = context.clock.now();
        let records: Vec<_> = context
            .documents
            .document_set(true)
            .into_iter()
            .map(|schema| DocumentRecord::pending(schema.document_type(), schema.is_required(), now))
            .collect();
        let draft = QuotationDraft::new(records, now);

        tracing::info!(quotation_id = %draft.id(), steps = context.flow.len(), "Quotation started");

        Self {
            context,
            draft,
            state: FlowState::Active,
        }
    }

    pub fn draft(&self) -> &QuotationDraft {
        &self.draft
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.context.flow
    }

    pub fn current_step(&self) -> Option<StepKind> {
        self.context.flow.step(self.draft.step_index()).map(|s| s.kind)
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<QuotationEvent> {
        self.draft.take_events()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Validates the current step and moves to the next one
    ///
    /// # Returns
    ///
    /// The new 1-based step index
    ///
    /// # Errors
    ///
    /// - `Validation` with every problem found; the error map is replaced
    /// - `SubmissionRequired` on the pre-confirmation step
    pub fn advance(&mut self) -> Result<usize, WorkflowError> {
        self.ensure_editable()?;

        let from = self.draft.step_index();
        if from >= self.context.flow.submission_index() {
            return Err(WorkflowError::SubmissionRequired);
        }
        let to = from + 1;
        let today = self.context.clock.today();

        let mut errors = self.step_errors(from, today);
        let mut premium = None;
        let entering_rated_step = self
            .context
            .flow
            .step(to)
            .map(|s| s.rating_dependent)
            .unwrap_or(false);
        if errors.is_empty() && entering_rated_step {
            match self.rate(today) {
                Ok(breakdown) => premium = Some(breakdown),
                Err(error) => errors.push(self.rating_step_error(&error)),
            }
        }

        if !errors.is_empty() {
            self.draft.replace_errors(&errors);
            tracing::warn!(
                quotation_id = %self.draft.id(),
                step = from,
                errors = errors.len(),
                "Step validation failed"
            );
            return Err(WorkflowError::Validation(errors));
        }

        let now = self.context.clock.now();
        if let Some(breakdown) = premium {
            self.store_premium(breakdown);
        }
        self.draft.replace_errors(&[]);
        self.draft.move_to(to, now);
        self.draft.record(QuotationEvent::StepAdvanced {
            quotation_id: self.draft.id(),
            from,
            to,
            timestamp: now,
        });
        tracing::info!(quotation_id = %self.draft.id(), from, to, "Advanced quotation step");
        Ok(to)
    }

    /// Moves back one step without validation, stopping at step 1
    pub fn retreat(&mut self) -> Result<usize, WorkflowError> {
        self.ensure_editable()?;

        let from = self.draft.step_index();
        let to = from.saturating_sub(1).max(1);
        if to != from {
            let now = self.context.clock.now();
            self.draft.move_to(to, now);
            self.draft.record(QuotationEvent::StepRetreated {
                quotation_id: self.draft.id(),
                from,
                to,
                timestamp: now,
            });
            tracing::info!(quotation_id = %self.draft.id(), from, to, "Retreated quotation step");
        }
        Ok(to)
    }

    /// Moves to any step up to the highest one validly reached
    ///
    /// Jumping onto a rating-dependent step without a current premium rates
    /// the draft first, as entering it by `advance` would.
    pub fn jump_to(&mut self, step: usize) -> Result<usize, WorkflowError> {
        self.ensure_editable()?;

        let highest = self.draft.highest_reached();
        if step == 0 || step > highest {
            return Err(WorkflowError::JumpNotAllowed {
                requested: step,
                highest,
            });
        }
        let from = self.draft.step_index();
        if step == from {
            return Ok(step);
        }

        let rated = self.context.flow.step(step).map(|s| s.rating_dependent).unwrap_or(false);
        if rated && self.draft.premium().is_none() {
            let today = self.context.clock.today();
            match self.rate(today) {
                Ok(breakdown) => self.store_premium(breakdown),
                Err(error) => {
                    let errors = vec![self.rating_step_error(&error)];
                    self.draft.replace_errors(&errors);
                    return Err(WorkflowError::Validation(errors));
                }
            }
        }

        let now = self.context.clock.now();
        self.draft.move_to(step, now);
        self.draft.record(QuotationEvent::StepJumped {
            quotation_id: self.draft.id(),
            from,
            to: step,
            timestamp: now,
        });
        tracing::info!(quotation_id = %self.draft.id(), from, to = step, "Jumped to quotation step");
        Ok(step)
    }

    // ========================================================================
    // Declared fields
    // ========================================================================

    /// Records a new value for `field`
    ///
    /// A rating-relevant change drops the premium without recomputing it.
    /// Documents cross-checked against the field are re-validated.
    pub fn field_changed(&mut self, field: FormField, value: impl Into<String>) -> Result<(), WorkflowError> {
        self.ensure_editable()?;

        let now = self.context.clock.now();
        self.draft.set_value(field, value.into(), now);
        self.draft.clear_error(ErrorKey::Field(field));
        self.after_field_change(field);
        Ok(())
    }

    /// Records a value by its form key, e.g. `"vehicleValue"`
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), WorkflowError> {
        let field: FormField = key.parse()?;
        self.field_changed(field, value)
    }

    fn after_field_change(&mut self, field: FormField) {
        let now = self.context.clock.now();
        if field.is_rating_relevant() && self.draft.invalidate_premium() {
            self.draft.record(QuotationEvent::PremiumInvalidated {
                quotation_id: self.draft.id(),
                field,
                timestamp: now,
            });
            tracing::debug!(quotation_id = %self.draft.id(), field = %field, "Premium invalidated");
        }
        self.revalidate_documents(field);
    }

    fn revalidate_documents(&mut self, field: FormField) {
        let catalog = Arc::clone(&self.context.documents);
        let today = self.context.clock.today();
        let now = self.context.clock.now();

        for document_type in catalog.dependents_of(field.key()) {
            let Some(schema) = catalog.schema(document_type) else {
                continue;
            };
            let Some(extraction) = self
                .draft
                .document(document_type)
                .filter(|r| matches!(r.status(), DocumentStatus::Validated | DocumentStatus::ValidationFailed))
                .and_then(|r| r.extraction())
                .cloned()
            else {
                continue;
            };

            let validation = validate_document(schema, &extraction, &self.draft, today);
            let error_count = validation.errors.len();
            let Some(record) = self.draft.document_mut(document_type) else {
                continue;
            };
            if record.revalidate(validation, now).is_ok() {
                let status = record.status();
                self.draft.record(QuotationEvent::DocumentValidated {
                    quotation_id: self.draft.id(),
                    document_type,
                    status,
                    error_count,
                    timestamp: now,
                });
            }
        }
    }

    // ========================================================================
    // Rating
    // ========================================================================

    /// Rates the draft with the selected insurer and stores the premium
    pub fn recalculate(&mut self) -> Result<PremiumBreakdown, WorkflowError> {
        self.ensure_editable()?;

        let today = self.context.clock.today();
        match self.rate(today) {
            Ok(breakdown) => {
                self.draft.clear_error(ErrorKey::Form);
                self.store_premium(breakdown.clone());
                Ok(breakdown)
            }
            Err(error) => {
                let step_error = self.rating_step_error(&error);
                self.draft.set_error(step_error.key, step_error.message);
                Err(WorkflowError::Rating(error))
            }
        }
    }

    /// Underwriters with a table for the selected cover on its start date
    pub fn available_underwriters(&self) -> Result<Vec<UnderwriterSummary>, WorkflowError> {
        let product = self.selected_product()?;
        let date = self.draft.start_date().unwrap_or_else(|| self.context.clock.today());
        Ok(self.context.rating.available_underwriters(product, date))
    }

    /// Rates the draft once per candidate, in the order given
    pub fn compare_underwriters(&self, candidates: &[UnderwriterId]) -> Result<Vec<UnderwriterQuote>, WorkflowError> {
        let Some(first) = candidates.first() else {
            return Ok(Vec::new());
        };
        let today = self.context.clock.today();
        let request = self.draft.rating_request(today, Some(first.clone()))?;
        Ok(self.context.rating.compare_underwriters(&request, candidates))
    }

    /// Rates the draft with every underwriter offering the selected cover
    pub fn compare_available(&self) -> Result<Vec<UnderwriterQuote>, WorkflowError> {
        let candidates: Vec<_> = self
            .available_underwriters()?
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        self.compare_underwriters(&candidates)
    }

    fn selected_product(&self) -> Result<ProductCode, WorkflowError> {
        self.draft.product().ok_or_else(|| {
            WorkflowError::Rating(RatingError::invalid(RatingInput::Product, "Select a cover type first"))
        })
    }

    fn rate(&self, today: chrono::NaiveDate) -> Result<PremiumBreakdown, RatingError> {
        let request = self.draft.rating_request(today, None)?;
        self.context.rating.quote(&request)
    }

    fn store_premium(&mut self, breakdown: PremiumBreakdown) {
        self.draft.record(QuotationEvent::PremiumComputed {
            quotation_id: self.draft.id(),
            underwriter: breakdown.underwriter_id().clone(),
            total_premium: breakdown.total_premium().amount(),
            currency: breakdown.currency().code().to_string(),
            timestamp: self.context.clock.now(),
        });
        self.draft.set_premium(Some(breakdown));
    }

    fn rating_step_error(&self, error: &RatingError) -> StepError {
        match error {
            RatingError::InvalidRequest { input, message } => {
                StepError::new(ErrorKey::Field(FormField::for_rating_input(*input)), message.clone())
            }
            RatingError::Configuration(configuration) => {
                tracing::error!(
                    quotation_id = %self.draft.id(),
                    error = %configuration,
                    "Rate table configuration error"
                );
                StepError::new(ErrorKey::Form, CONFIGURATION_MESSAGE)
            }
        }
    }

    // ========================================================================
    // Step checks
    // ========================================================================

    fn step_errors(&self, index: usize, today: chrono::NaiveDate) -> Vec<StepError> {
        let Some(step) = self.context.flow.step(index) else {
            return Vec::new();
        };

        let mut errors = step.rules.validate(self.draft.values(), today);
        if step.checks_underwriter {
            let flagged = |field| errors.iter().any(|e| e.key == ErrorKey::Field(field));
            if !flagged(FormField::Insurer) && !flagged(FormField::CoverType) {
                errors.extend(self.underwriter_error(today));
            }
        }
        if step.requires_documents {
            errors.extend(self.document_errors());
        }
        errors
    }

    fn underwriter_error(&self, today: chrono::NaiveDate) -> Option<StepError> {
        let product = self.draft.product()?;
        let insurer = UnderwriterId::new(self.draft.value(FormField::Insurer)?);
        let date = self.draft.start_date().unwrap_or(today);

        match self.context.rating.ensure_offered(&insurer, product, date) {
            Ok(()) => None,
            Err(error) => {
                tracing::debug!(underwriter = %insurer, product = %product, error = %error, "Insurer not offered");
                Some(StepError::new(
                    ErrorKey::Field(FormField::Insurer),
                    "The selected insurer does not offer this cover",
                ))
            }
        }
    }

    /// Documents requested for the selected cover
    pub fn requested_documents(&self) -> Vec<&DocumentSchema> {
        let requires_valuation = self.draft.product() == Some(ProductCode::Comprehensive);
        self.context.documents.document_set(requires_valuation)
    }

    fn document_errors(&self) -> Vec<StepError> {
        self.requested_documents()
            .into_iter()
            .filter(|schema| schema.is_required())
            .filter_map(|schema| {
                let document_type = schema.document_type();
                let record = self.draft.document(document_type);
                let message = match record.map(|r| r.status()) {
                    Some(DocumentStatus::Validated) => return None,
                    None | Some(DocumentStatus::Pending) => format!("{} is required", document_type),
                    Some(DocumentStatus::Processing) => format!("{} is still being processed", document_type),
                    Some(DocumentStatus::ValidationFailed) => {
                        match record.and_then(|r| r.validation()).and_then(|v| v.errors.first()) {
                            Some(first) => format!("{}: {}", document_type, first),
                            None => format!("{} failed validation", document_type),
                        }
                    }
                    Some(DocumentStatus::UploadFailed) => {
                        format!("{} upload failed, please try again", document_type)
                    }
                };
                Some(StepError::new(ErrorKey::Document(document_type), message))
            })
            .collect()
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Replaces the record for `document_type` with a fresh one in
    /// `Processing` and hands back the ticket for the extraction
    ///
    /// # Errors
    ///
    /// `Document` if the type is not requested for the selected cover, or the
    /// file is too large or of an unaccepted kind. The record is then left as
    /// it was.
    pub fn begin_document_upload(
        &mut self,
        document_type: DocumentType,
        capture: CapturedDocument,
    ) -> Result<UploadTicket, WorkflowError> {
        self.ensure_editable()?;

        let schema = self
            .requested_documents()
            .into_iter()
            .find(|s| s.document_type() == document_type)
            .ok_or(DocumentError::NotRequested(document_type))?;
        schema.check_capture(&capture)?;
        let required = schema.is_required();

        let now = self.context.clock.now();
        let upload_id = UploadId::new_v7();
        self.draft.put_document(DocumentRecord::processing(
            document_type,
            required,
            capture.clone(),
            upload_id,
            now,
        ));
        self.draft.clear_error(ErrorKey::Document(document_type));
        self.draft.record(QuotationEvent::DocumentUploadStarted {
            quotation_id: self.draft.id(),
            document_type,
            upload_id,
            timestamp: now,
        });
        tracing::info!(
            quotation_id = %self.draft.id(),
            document_type = document_type.key(),
            upload_id = %upload_id,
            size_bytes = capture.size_bytes,
            "Document upload started"
        );

        Ok(UploadTicket {
            quotation_id: self.draft.id(),
            document_type,
            upload_id,
            capture,
        })
    }

    /// Applies the extraction result for `ticket`
    ///
    /// The result is validated against the declared fields and the record
    /// moves to `Validated`, `ValidationFailed` or `UploadFailed`. A result
    /// for a cancelled flow or a replaced upload is discarded.
    pub fn complete_document_upload(
        &mut self,
        ticket: UploadTicket,
        outcome: Result<Extraction, PortError>,
    ) -> UploadOutcome {
        let document_type = ticket.document_type;
        if self.state != FlowState::Active || ticket.quotation_id != self.draft.id() {
            tracing::warn!(
                quotation_id = %ticket.quotation_id,
                document_type = document_type.key(),
                state = ?self.state,
                "Discarding extraction result for inactive quotation"
            );
            return UploadOutcome::Discarded;
        }

        let current = self
            .draft
            .document(document_type)
            .map(|r| r.is_in_flight() && r.upload_id() == Some(ticket.upload_id))
            .unwrap_or(false);
        let catalog = Arc::clone(&self.context.documents);
        let schema = match catalog.schema(document_type) {
            Some(schema) if current => schema,
            _ => {
                tracing::warn!(
                    quotation_id = %ticket.quotation_id,
                    document_type = document_type.key(),
                    upload_id = %ticket.upload_id,
                    "Discarding stale extraction result"
                );
                return UploadOutcome::Discarded;
            }
        };

        let now = self.context.clock.now();
        let quotation_id = self.draft.id();

        match outcome {
            Err(error) => {
                let kind = error.kind();
                let message = error.to_string();
                let failed = self
                    .draft
                    .document_mut(document_type)
                    .map(|record| record.fail_upload(message.clone(), now).is_ok())
                    .unwrap_or(false);
                if !failed {
                    return UploadOutcome::Discarded;
                }
                self.draft.record(QuotationEvent::DocumentUploadFailed {
                    quotation_id,
                    document_type,
                    reason: message.clone(),
                    timestamp: now,
                });
                tracing::warn!(
                    quotation_id = %quotation_id,
                    document_type = document_type.key(),
                    failure = kind,
                    error = %message,
                    "Document extraction failed"
                );
                UploadOutcome::UploadFailed { kind, message }
            }
            Ok(extraction) => {
                let today = self.context.clock.today();
                let validation = validate_document(schema, &extraction, &self.draft, today);
                let error_count = validation.errors.len();
                let is_valid = validation.is_valid;

                let completed = self
                    .draft
                    .document_mut(document_type)
                    .map(|record| record.complete(extraction.clone(), validation.clone(), now).is_ok())
                    .unwrap_or(false);
                if !completed {
                    return UploadOutcome::Discarded;
                }
                let status = if is_valid {
                    DocumentStatus::Validated
                } else {
                    DocumentStatus::ValidationFailed
                };
                self.draft.record(QuotationEvent::DocumentValidated {
                    quotation_id,
                    document_type,
                    status,
                    error_count,
                    timestamp: now,
                });
                tracing::info!(
                    quotation_id = %quotation_id,
                    document_type = document_type.key(),
                    valid = is_valid,
                    confidence = extraction.confidence,
                    "Document validated"
                );

                if is_valid && self.context.settings.autofill_declared_fields {
                    self.autofill(schema, &extraction, document_type);
                }

                if is_valid {
                    UploadOutcome::Validated(validation)
                } else {
                    UploadOutcome::ValidationFailed(validation)
                }
            }
        }
    }

    /// Uploads a captured file through the intake adapter and applies the result
    pub async fn document_uploaded(
        &mut self,
        document_type: DocumentType,
        capture: CapturedDocument,
        intake: &dyn DocumentIntakePort,
    ) -> Result<UploadOutcome, WorkflowError> {
        let ticket = self.begin_document_upload(document_type, capture)?;
        let metadata = OperationMetadata::with_correlation_id(ticket.upload_id.to_string())
            .for_quotation(ticket.quotation_id);

        let outcome = intake.extract(document_type, &ticket.capture, Some(metadata)).await;
        Ok(self.complete_document_upload(ticket, outcome))
    }

    /// Fills empty declared fields from a validated extraction
    ///
    /// Values the proposer typed are never overwritten.
    fn autofill(&mut self, schema: &DocumentSchema, extraction: &Extraction, document_type: DocumentType) {
        let now = self.context.clock.now();
        for pair in schema.must_match_pairs() {
            let Ok(field) = pair.form_field.parse::<FormField>() else {
                continue;
            };
            if self.draft.value(field).is_some() {
                continue;
            }
            let Some(value) = extraction.field(&pair.extracted_field) else {
                continue;
            };

            self.draft.set_value(field, value.to_string(), now);
            self.draft.record(QuotationEvent::FieldAutofilled {
                quotation_id: self.draft.id(),
                field,
                document_type,
                timestamp: now,
            });
            tracing::debug!(quotation_id = %self.draft.id(), field = %field, "Field filled from document");
            self.after_field_change(field);
        }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Checks the submission preconditions and marks the draft as submitting
    ///
    /// Submission is legal only from the pre-confirmation step, with every
    /// requested required document validated, a premium and a payment method.
    ///
    /// # Returns
    ///
    /// The payload to hand to the transport adapter
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, WorkflowError> {
        match self.state {
            FlowState::Cancelled => return Err(WorkflowError::FlowCancelled),
            FlowState::Completed => return Err(WorkflowError::FlowCompleted),
            FlowState::Active => {}
        }
        if self.draft.is_submitting() {
            return Err(WorkflowError::SubmissionInFlight);
        }

        let submission_index = self.context.flow.submission_index();
        if self.draft.step_index() != submission_index {
            return Err(WorkflowError::NotReadyForSubmission(vec![format!(
                "Quotation can only be submitted from step {}",
                submission_index
            )]));
        }

        let today = self.context.clock.today();
        let mut errors = self.step_errors(submission_index, today);
        let documents_checked = self
            .context
            .flow
            .step(submission_index)
            .map(|s| s.requires_documents)
            .unwrap_or(false);
        if !documents_checked {
            errors.extend(self.document_errors());
        }
        if self.draft.premium().is_none() {
            errors.push(StepError::new(ErrorKey::Form, "Premium has not been calculated"));
        }
        if !errors.is_empty() {
            self.draft.replace_errors(&errors);
            tracing::warn!(
                quotation_id = %self.draft.id(),
                errors = errors.len(),
                "Quotation not ready for submission"
            );
            return Err(WorkflowError::NotReadyForSubmission(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        let request = self.draft.rating_request(today, None)?;
        let (Some(premium), Some(payment)) = (self.draft.premium().cloned(), self.draft.payment_selection()) else {
            return Err(WorkflowError::NotReadyForSubmission(vec![
                "Select a payment method".to_string(),
            ]));
        };

        let now = self.context.clock.now();
        let submission_id = SubmissionId::new_v7();
        let payload = SubmissionPayload {
            submission_id,
            quotation_id: self.draft.id(),
            proposer: self.draft.proposer(),
            vehicle: request.vehicle,
            driver: request.driver,
            coverage: request.coverage,
            history: request.history,
            documents: self.draft.document_summaries(),
            premium,
            payment,
            prepared_at: now,
        };

        self.draft.start_submission(submission_id);
        self.draft.replace_errors(&[]);
        self.draft.record(QuotationEvent::SubmissionStarted {
            quotation_id: self.draft.id(),
            submission_id,
            timestamp: now,
        });
        tracing::info!(
            quotation_id = %self.draft.id(),
            submission_id = %submission_id,
            total_premium = %payload.premium.total_premium(),
            "Submitting quotation"
        );
        Ok(payload)
    }

    /// Applies the transport adapter's outcome
    ///
    /// Success moves the flow to the confirmation step and completes it. A
    /// failure clears the submitting flag and leaves the step unchanged.
    pub fn complete_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, PortError>,
    ) -> Result<SubmissionReceipt, WorkflowError> {
        if self.state == FlowState::Cancelled {
            tracing::warn!(quotation_id = %self.draft.id(), "Discarding submission result for cancelled quotation");
            return Err(WorkflowError::FlowCancelled);
        }
        let Some(submission_id) = self.draft.submission_id() else {
            return Err(WorkflowError::NotReadyForSubmission(vec![
                "No submission is in progress".to_string(),
            ]));
        };

        let now = self.context.clock.now();
        let quotation_id = self.draft.id();
        match outcome {
            Ok(receipt) => {
                self.draft.finish_submission(Some(receipt.clone()));
                self.draft.move_to(self.context.flow.confirmation_index(), now);
                self.state = FlowState::Completed;
                self.draft.record(QuotationEvent::QuotationSubmitted {
                    quotation_id,
                    submission_id,
                    reference_id: receipt.reference_id.clone(),
                    timestamp: now,
                });
                tracing::info!(
                    quotation_id = %quotation_id,
                    reference_id = %receipt.reference_id,
                    "Quotation submitted"
                );
                Ok(receipt)
            }
            Err(error) => {
                self.draft.finish_submission(None);
                self.draft.set_error(ErrorKey::Form, format!("Submission failed: {}", error));
                self.draft.record(QuotationEvent::SubmissionFailed {
                    quotation_id,
                    submission_id,
                    failure_kind: error.kind().to_string(),
                    reason: error.to_string(),
                    timestamp: now,
                });
                tracing::warn!(
                    quotation_id = %quotation_id,
                    failure = error.kind(),
                    error = %error,
                    "Quotation submission failed"
                );
                Err(WorkflowError::Adapter(error))
            }
        }
    }

    /// Submits through the transport adapter and applies its outcome
    pub async fn submit(&mut self, port: &dyn SubmissionPort) -> Result<SubmissionReceipt, WorkflowError> {
        let payload = self.begin_submission()?;
        let metadata = OperationMetadata::with_correlation_id(payload.submission_id.to_string())
            .for_quotation(payload.quotation_id);

        let outcome = port.submit(&payload, Some(metadata)).await;
        self.complete_submission(outcome)
    }

    /// Abandons the quotation and discards the draft
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            FlowState::Completed => Err(WorkflowError::FlowCompleted),
            FlowState::Cancelled => Ok(()),
            FlowState::Active => {
                let now = self.context.clock.now();
                self.draft.discard(now);
                self.state = FlowState::Cancelled;
                self.draft.record(QuotationEvent::QuotationCancelled {
                    quotation_id: self.draft.id(),
                    timestamp: now,
                });
                tracing::info!(quotation_id = %self.draft.id(), "Quotation cancelled");
                Ok(())
            }
        }
    }

    fn ensure_editable(&self) -> Result<(), WorkflowError> {
        match self.state {
            FlowState::Cancelled => Err(WorkflowError::FlowCancelled),
            FlowState::Completed => Err(WorkflowError::FlowCompleted),
            FlowState::Active if self.draft.is_submitting() => Err(WorkflowError::SubmissionInFlight),
            FlowState::Active => Ok(()),
        }
    }
}
