//! Proposal form fields
//!
//! Every value the proposer types is held as text keyed by [`FormField`] and
//! parsed when it is needed (rating, submission). The camelCase keys are the
//! ones document schemas name in their must-match pairs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use domain_documents::DocumentType;
use domain_rating::RatingInput;

use crate::error::WorkflowError;

/// The fields of the motor proposal form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    // Personal details
    OwnerName,
    OwnerIdNumber,
    OwnerPhone,
    OwnerEmail,
    KraPin,
    DateOfBirth,
    YearsLicensed,
    // Vehicle and cover
    VehicleCategory,
    CoverType,
    RegistrationNumber,
    Make,
    Model,
    YearOfManufacture,
    EngineCapacity,
    VehicleValue,
    UsageType,
    Insurer,
    InsuranceDuration,
    StartDate,
    ClaimsHistory,
    Modifications,
    // Payment
    PaymentMethod,
    PaymentPhone,
}

impl FormField {
    pub const ALL: [FormField; 23] = [
        FormField::OwnerName,
        FormField::OwnerIdNumber,
        FormField::OwnerPhone,
        FormField::OwnerEmail,
        FormField::KraPin,
        FormField::DateOfBirth,
        FormField::YearsLicensed,
        FormField::VehicleCategory,
        FormField::CoverType,
        FormField::RegistrationNumber,
        FormField::Make,
        FormField::Model,
        FormField::YearOfManufacture,
        FormField::EngineCapacity,
        FormField::VehicleValue,
        FormField::UsageType,
        FormField::Insurer,
        FormField::InsuranceDuration,
        FormField::StartDate,
        FormField::ClaimsHistory,
        FormField::Modifications,
        FormField::PaymentMethod,
        FormField::PaymentPhone,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FormField::OwnerName => "ownerName",
            FormField::OwnerIdNumber => "ownerIdNumber",
            FormField::OwnerPhone => "ownerPhone",
            FormField::OwnerEmail => "ownerEmail",
            FormField::KraPin => "kraPin",
            FormField::DateOfBirth => "dateOfBirth",
            FormField::YearsLicensed => "yearsLicensed",
            FormField::VehicleCategory => "vehicleCategory",
            FormField::CoverType => "coverType",
            FormField::RegistrationNumber => "registrationNumber",
            FormField::Make => "make",
            FormField::Model => "model",
            FormField::YearOfManufacture => "yearOfManufacture",
            FormField::EngineCapacity => "engineCapacity",
            FormField::VehicleValue => "vehicleValue",
            FormField::UsageType => "usageType",
            FormField::Insurer => "insurer",
            FormField::InsuranceDuration => "insuranceDuration",
            FormField::StartDate => "startDate",
            FormField::ClaimsHistory => "claimsHistory",
            FormField::Modifications => "modifications",
            FormField::PaymentMethod => "paymentMethod",
            FormField::PaymentPhone => "paymentPhone",
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            FormField::OwnerName => "Full name",
            FormField::OwnerIdNumber => "ID number",
            FormField::OwnerPhone => "Phone number",
            FormField::OwnerEmail => "Email address",
            FormField::KraPin => "KRA PIN",
            FormField::DateOfBirth => "Date of birth",
            FormField::YearsLicensed => "Years licensed",
            FormField::VehicleCategory => "Vehicle category",
            FormField::CoverType => "Cover type",
            FormField::RegistrationNumber => "Registration number",
            FormField::Make => "Vehicle make",
            FormField::Model => "Vehicle model",
            FormField::YearOfManufacture => "Year of manufacture",
            FormField::EngineCapacity => "Engine capacity",
            FormField::VehicleValue => "Vehicle value",
            FormField::UsageType => "Vehicle usage",
            FormField::Insurer => "Insurer",
            FormField::InsuranceDuration => "Insurance duration",
            FormField::StartDate => "Cover start date",
            FormField::ClaimsHistory => "Claims history",
            FormField::Modifications => "Vehicle modifications",
            FormField::PaymentMethod => "Payment method",
            FormField::PaymentPhone => "M-Pesa phone number",
        }
    }

    /// Returns true if a change to this field invalidates a computed premium
    pub fn is_rating_relevant(&self) -> bool {
        matches!(
            self,
            FormField::Insurer
                | FormField::VehicleValue
                | FormField::YearOfManufacture
                | FormField::EngineCapacity
                | FormField::UsageType
                | FormField::InsuranceDuration
                | FormField::CoverType
                | FormField::VehicleCategory
                | FormField::DateOfBirth
                | FormField::YearsLicensed
                | FormField::StartDate
                | FormField::ClaimsHistory
                | FormField::Modifications
        )
    }

    /// The form field a rating input is read from
    pub fn for_rating_input(input: RatingInput) -> FormField {
        match input {
            RatingInput::DeclaredValue => FormField::VehicleValue,
            RatingInput::YearOfManufacture => FormField::YearOfManufacture,
            RatingInput::EngineCapacity => FormField::EngineCapacity,
            RatingInput::UsageType => FormField::UsageType,
            RatingInput::VehicleCategory => FormField::VehicleCategory,
            RatingInput::DriverAge => FormField::DateOfBirth,
            RatingInput::YearsLicensed => FormField::YearsLicensed,
            RatingInput::Underwriter => FormField::Insurer,
            RatingInput::Product => FormField::CoverType,
            RatingInput::Duration => FormField::InsuranceDuration,
            RatingInput::StartDate => FormField::StartDate,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FormField {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| WorkflowError::UnknownField(s.to_string()))
    }
}

/// Where a validation message is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    Field(FormField),
    Document(DocumentType),
    /// Not attributable to a single field
    Form,
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Field(field) => write!(f, "{}", field.key()),
            ErrorKey::Document(document_type) => write!(f, "document.{}", document_type.key()),
            ErrorKey::Form => f.write_str("form"),
        }
    }
}

impl Serialize for ErrorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses an amount typed with optional thousands separators
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let digits: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    Decimal::from_str(&digits).ok()
}

/// Parses a yes/no answer
pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}
