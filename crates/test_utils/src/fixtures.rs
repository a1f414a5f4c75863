//! Pre-built Test Fixtures
//!
//! Provides ready-to-use proposals, extractions and clocks for the
//! quotation core. Dates are anchored on 15 July 2025 in Nairobi so that
//! vehicle ages, future and recent checks are predictable.

use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use core_kernel::{Clock, FixedClock, Timezone};
use domain_documents::{CapturedDocument, Extraction, MimeKind};
use domain_quotation::{FormField, QuotationWorkflow, WorkflowContext, WorkflowSettings};
use domain_rating::catalog::motor_catalog;
use domain_rating::{RateTableRegistry, RatingService};

use crate::builders::ExtractionBuilder;

static MOTOR_REGISTRY: Lazy<Arc<RateTableRegistry>> =
    Lazy::new(|| Arc::new(motor_catalog().expect("embedded motor catalog builds")));

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The date every fixture is evaluated on
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    /// Cover start date a few days ahead of `today`
    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    /// A clock frozen on `today` in Nairobi
    pub fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::on_date(Self::today(), Timezone::default()))
    }
}

/// Fixture for the shared rating collaborators
pub struct RatingFixtures;

impl RatingFixtures {
    /// The embedded motor catalog, built once per test binary
    pub fn registry() -> Arc<RateTableRegistry> {
        Arc::clone(&MOTOR_REGISTRY)
    }

    pub fn service() -> RatingService {
        RatingService::new(Self::registry())
    }
}

/// Fixture for workflow wiring
pub struct WorkflowFixtures;

impl WorkflowFixtures {
    /// Default settings, the motor catalog and a frozen clock
    pub fn context() -> WorkflowContext {
        Self::context_with(WorkflowSettings::default())
    }

    pub fn context_with(settings: WorkflowSettings) -> WorkflowContext {
        WorkflowContext::new(RatingFixtures::service(), TemporalFixtures::clock(), settings)
    }

    pub fn start() -> QuotationWorkflow {
        QuotationWorkflow::start(Self::context())
    }
}

/// Fixture for declared form values
pub struct ProposalFixtures;

impl ProposalFixtures {
    pub fn personal() -> Vec<(FormField, &'static str)> {
        vec![
            (FormField::OwnerName, "Wanjiku Kamau"),
            (FormField::OwnerIdNumber, "12345678"),
            (FormField::OwnerPhone, "0712345678"),
            (FormField::OwnerEmail, "wanjiku@example.co.ke"),
            (FormField::KraPin, "A123456789K"),
            (FormField::DateOfBirth, "1990-03-15"),
            (FormField::YearsLicensed, "10"),
        ]
    }

    /// A 2018 Toyota Fielder insured with Sanlam for twelve months
    ///
    /// # Arguments
    ///
    /// * `cover` - Cover type key, e.g. `tor` or `comprehensive`
    pub fn vehicle(cover: &'static str) -> Vec<(FormField, &'static str)> {
        vec![
            (FormField::VehicleCategory, "private_car"),
            (FormField::CoverType, cover),
            (FormField::RegistrationNumber, "KDA 123A"),
            (FormField::Make, "Toyota"),
            (FormField::Model, "Fielder"),
            (FormField::YearOfManufacture, "2018"),
            (FormField::EngineCapacity, "1500"),
            (FormField::VehicleValue, "1,200,000"),
            (FormField::UsageType, "private"),
            (FormField::Insurer, "sanlam"),
            (FormField::InsuranceDuration, "12"),
            (FormField::StartDate, "2025-07-20"),
            (FormField::ClaimsHistory, "no"),
            (FormField::Modifications, "no"),
        ]
    }

    pub fn mpesa_payment() -> Vec<(FormField, &'static str)> {
        vec![
            (FormField::PaymentMethod, "mpesa"),
            (FormField::PaymentPhone, "0712345678"),
        ]
    }

    /// Applies `values` to the draft
    ///
    /// # Panics
    ///
    /// Panics if the workflow refuses an edit
    pub fn fill(workflow: &mut QuotationWorkflow, values: &[(FormField, &str)]) {
        for (field, value) in values {
            workflow
                .field_changed(*field, *value)
                .unwrap_or_else(|e| panic!("cannot set {}: {}", field, e));
        }
    }
}

/// Fixture for document extractions matching [`ProposalFixtures`]
pub struct ExtractionFixtures;

impl ExtractionFixtures {
    pub fn national_id() -> Extraction {
        ExtractionBuilder::new()
            .field("fullName", "WANJIKU KAMAU")
            .field("idNumber", "12345678")
            .field("dateOfBirth", "15/03/1990")
            .build()
    }

    pub fn driving_license() -> Extraction {
        ExtractionBuilder::new()
            .field("licenseNumber", "DL12345ABC")
            .field("expiryDate", "2027-01-01")
            .field("fullName", "Wanjiku Kamau")
            .build()
    }

    pub fn logbook() -> Extraction {
        ExtractionBuilder::new()
            .field("registrationNumber", "KDA123A")
            .field("chassisNumber", "JT123456789")
            .field("yearOfManufacture", "2018")
            .field("engineCapacity", "1,500")
            .build()
    }

    pub fn kra_pin() -> Extraction {
        ExtractionBuilder::new().field("pinNumber", "A123456789K").build()
    }

    /// A valuation report dated `valued_on`
    pub fn valuation_report(valued_on: &'static str) -> Extraction {
        ExtractionBuilder::new()
            .field("valuationDate", valued_on)
            .field("registrationNumber", "KDA 123A")
            .build()
    }

    /// A captured photo of the given size
    pub fn capture(name: &str, size_bytes: u64) -> CapturedDocument {
        CapturedDocument {
            raw_ref: format!("capture://{}", name),
            mime_kind: MimeKind::Image,
            size_bytes,
        }
    }
}
