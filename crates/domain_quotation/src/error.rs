//! Quotation workflow errors
//!
//! A failed transition never partially applies. Validation failures always
//! carry the full list of problems so every one can be shown at once.

use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_documents::DocumentError;
use domain_rating::RatingError;

use crate::fields::ErrorKey;

/// One validation problem, attached to a field, a document or the whole form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub key: ErrorKey,
    pub message: String,
}

impl StepError {
    pub fn new(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

/// Errors that can occur while driving a quotation
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The current step's rules failed
    #[error("Step validation failed with {} error(s)", .0.len())]
    Validation(Vec<StepError>),

    /// Rating failed outside a step transition
    #[error(transparent)]
    Rating(#[from] RatingError),

    /// The document could not be accepted
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// An adapter failed; the user may retry
    #[error("Adapter failure: {0}")]
    Adapter(#[from] PortError),

    /// Jump target lies beyond the highest step validly reached
    #[error("Cannot jump to step {requested}, the highest step reached is {highest}")]
    JumpNotAllowed {
        requested: usize,
        highest: usize,
    },

    /// The pre-confirmation step is left by submitting, not by advancing
    #[error("The quotation must be submitted to continue")]
    SubmissionRequired,

    /// Submission preconditions are not met
    #[error("Quotation is not ready for submission: {}", .0.join("; "))]
    NotReadyForSubmission(Vec<String>),

    /// A submission is waiting on the adapter
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Quotation has been cancelled")]
    FlowCancelled,

    #[error("Quotation has already been submitted")]
    FlowCompleted,

    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

impl WorkflowError {
    /// Returns the validation problems, if this is a validation failure
    pub fn step_errors(&self) -> &[StepError] {
        match self {
            WorkflowError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
