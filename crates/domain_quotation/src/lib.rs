//! Motor Quotation Workflow Domain
//!
//! This crate owns an in-progress motor quotation and walks the proposer
//! through the quotation steps, calling the rating engine and the document
//! validator at the right transitions.
//!
//! # Architecture
//!
//! - [`StepRuleSet`]: per-step field rules held as data and checked by one
//!   generic validator
//! - [`FlowDefinition`]: the ordered steps and what each one gates on
//! - [`QuotationDraft`]: the aggregate root, a single-owner record of the
//!   form, documents, premium and errors
//! - [`QuotationWorkflow`]: the step state machine; every transition either
//!   commits fully or leaves the draft untouched apart from its error map
//! - [`SubmissionPort`]: the boundary to the persistence and transport adapter
//!
//! # Suspension points
//!
//! Document extraction and submission are the only operations that wait on
//! an adapter. Both are split into a `begin_*` and a `complete_*` half so the
//! in-flight state is explicit on the draft, and a result arriving after the
//! flow was cancelled is discarded.

pub mod error;
pub mod fields;
pub mod payment;
pub mod rules;
pub mod flow;
pub mod settings;
pub mod events;
pub mod draft;
pub mod submission;
pub mod workflow;

pub use error::{WorkflowError, StepError};
pub use fields::{FormField, ErrorKey, parse_amount, parse_yes_no};
pub use payment::{PaymentMethod, PaymentSelection};
pub use rules::{Rule, Choice, FieldRules, StepRuleSet};
pub use flow::{FlowDefinition, StepDefinition, StepKind};
pub use settings::WorkflowSettings;
pub use events::QuotationEvent;
pub use draft::QuotationDraft;
pub use submission::{
    SubmissionPayload, SubmissionReceipt, SubmissionPort, ProposerDetails, DocumentSummary,
};
pub use workflow::{QuotationWorkflow, WorkflowContext, FlowState, UploadTicket, UploadOutcome};
