//! In-memory Adapter Mocks
//!
//! Stand-ins for the document intake and submission transport adapters.
//! Both record every call so tests can inspect what the workflow sent.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{DomainPort, OperationMetadata, PortError};
use domain_documents::{CapturedDocument, DocumentIntakePort, DocumentType, Extraction};
use domain_quotation::{SubmissionPayload, SubmissionPort, SubmissionReceipt};

use crate::fixtures::ExtractionFixtures;

/// One intake call as seen by the adapter
#[derive(Debug, Clone)]
pub struct IntakeCall {
    pub document_type: DocumentType,
    pub raw_ref: String,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone)]
enum IntakeScript {
    Extract(Extraction),
    Fail(String),
}

/// Intake adapter answering from a per-type script
///
/// Types without a script fail with an extraction error.
#[derive(Debug, Default)]
pub struct MockIntakeAdapter {
    scripts: Mutex<BTreeMap<DocumentType, IntakeScript>>,
    calls: Mutex<Vec<IntakeCall>>,
}

impl MockIntakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every document type with the matching fixture extraction
    pub fn with_fixtures() -> Self {
        Self::new()
            .with_extraction(DocumentType::NationalId, ExtractionFixtures::national_id())
            .with_extraction(DocumentType::DrivingLicense, ExtractionFixtures::driving_license())
            .with_extraction(DocumentType::Logbook, ExtractionFixtures::logbook())
            .with_extraction(DocumentType::KraPin, ExtractionFixtures::kra_pin())
            .with_extraction(
                DocumentType::ValuationReport,
                ExtractionFixtures::valuation_report("2025-06-01"),
            )
    }

    pub fn with_extraction(self, document_type: DocumentType, extraction: Extraction) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(document_type, IntakeScript::Extract(extraction));
        self
    }

    pub fn failing(self, document_type: DocumentType, message: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(document_type, IntakeScript::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<IntakeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl DomainPort for MockIntakeAdapter {}

#[async_trait]
impl DocumentIntakePort for MockIntakeAdapter {
    async fn extract(
        &self,
        document_type: DocumentType,
        capture: &CapturedDocument,
        metadata: Option<OperationMetadata>,
    ) -> Result<Extraction, PortError> {
        self.calls.lock().unwrap().push(IntakeCall {
            document_type,
            raw_ref: capture.raw_ref.clone(),
            correlation_id: metadata.and_then(|m| m.correlation_id),
        });

        match self.scripts.lock().unwrap().get(&document_type) {
            Some(IntakeScript::Extract(extraction)) => Ok(extraction.clone()),
            Some(IntakeScript::Fail(message)) => Err(PortError::extraction(message.clone())),
            None => Err(PortError::extraction(format!("no script for {}", document_type.key()))),
        }
    }
}

/// Scripted outcome of one submission attempt
#[derive(Debug, Clone)]
pub enum SubmissionScript {
    Accept(String),
    Reject(String),
    Timeout,
    Network,
}

/// Submission adapter playing back scripted outcomes in order
///
/// Once the script runs out every further attempt is accepted.
#[derive(Debug, Default)]
pub struct MockSubmissionAdapter {
    script: Mutex<VecDeque<SubmissionScript>>,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl MockSubmissionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, outcome: SubmissionScript) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// Every payload received, in order
    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

impl DomainPort for MockSubmissionAdapter {}

#[async_trait]
impl SubmissionPort for MockSubmissionAdapter {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        _metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError> {
        let attempt = {
            let mut payloads = self.payloads.lock().unwrap();
            payloads.push(payload.clone());
            payloads.len()
        };

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(SubmissionScript::Accept(reference_id)) => Ok(SubmissionReceipt { reference_id }),
            Some(SubmissionScript::Reject(reason)) => Err(PortError::rejected(reason)),
            Some(SubmissionScript::Timeout) => Err(PortError::timeout("submit quotation", 30_000)),
            Some(SubmissionScript::Network) => Err(PortError::connection("connection reset by peer")),
            None => Ok(SubmissionReceipt {
                reference_id: format!("MQ-TEST-{:04}", attempt),
            }),
        }
    }
}
