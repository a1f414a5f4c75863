//! Flow definition
//!
//! The ordered steps of a quotation. Steps are numbered from 1; the last step
//! is the confirmation, reached only through a successful submission, and the
//! step before it is where submission happens.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use domain_documents::patterns;

use crate::fields::FormField;
use crate::payment::is_mpesa;
use crate::rules::{Choice, Rule, StepRuleSet};

/// What a step is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    PersonalDetails,
    VehicleCoverage,
    Documents,
    PremiumPayment,
    Confirmation,
}

/// One step of the flow
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub kind: StepKind,
    pub rules: StepRuleSet,
    /// Every requested required document must be validated to leave the step
    pub requires_documents: bool,
    /// The step shows the premium, so it is rated before it is entered
    pub rating_dependent: bool,
    /// The selected insurer must offer the selected cover to leave the step
    pub checks_underwriter: bool,
}

impl StepDefinition {
    pub fn new(kind: StepKind, rules: StepRuleSet) -> Self {
        Self {
            kind,
            rules,
            requires_documents: false,
            rating_dependent: false,
            checks_underwriter: false,
        }
    }

    pub fn requiring_documents(mut self) -> Self {
        self.requires_documents = true;
        self
    }

    pub fn rating_dependent(mut self) -> Self {
        self.rating_dependent = true;
        self
    }

    pub fn checking_underwriter(mut self) -> Self {
        self.checks_underwriter = true;
        self
    }
}

/// The ordered steps of a quotation flow
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    steps: Vec<StepDefinition>,
}

impl FlowDefinition {
    /// Creates a flow from its steps; the last one is the confirmation
    pub fn new(steps: Vec<StepDefinition>) -> Self {
        Self { steps }
    }

    /// The canonical five-step motor quotation
    pub fn motor() -> Self {
        let personal = StepRuleSet::new()
            .field(
                FormField::OwnerName,
                [
                    Rule::Required,
                    Rule::MinLength(3),
                    Rule::pattern(&patterns::PERSON_NAME, "Name can only contain letters, spaces and hyphens"),
                ],
            )
            .field(
                FormField::OwnerIdNumber,
                [
                    Rule::Required,
                    Rule::pattern(&patterns::NATIONAL_ID_NUMBER, "ID number must be 7 or 8 digits"),
                ],
            )
            .field(
                FormField::OwnerPhone,
                [
                    Rule::Required,
                    Rule::pattern(&patterns::MOBILE_NUMBER, "Enter a valid Kenyan mobile number"),
                ],
            )
            .field(
                FormField::OwnerEmail,
                [Rule::Required, Rule::pattern(&patterns::EMAIL, "Enter a valid email address")],
            )
            .field(
                FormField::KraPin,
                [Rule::pattern(&patterns::KRA_PIN, "KRA PIN must look like A123456789K")],
            )
            .field(
                FormField::DateOfBirth,
                [Rule::Required, Rule::Date, Rule::MinimumAge(18)],
            )
            .field(
                FormField::YearsLicensed,
                [
                    Rule::pattern(&patterns::DIGITS, "Years licensed must be a whole number"),
                    Rule::range(dec!(0), dec!(70)),
                ],
            );

        let vehicle = StepRuleSet::new()
            .field(FormField::VehicleCategory, [Rule::Required, Rule::OneOf(Choice::Category)])
            .field(FormField::CoverType, [Rule::Required, Rule::OneOf(Choice::Product)])
            .field(
                FormField::RegistrationNumber,
                [
                    Rule::Required,
                    Rule::pattern(&patterns::REGISTRATION_NUMBER, "Enter a valid registration number, e.g. KDA 123A"),
                ],
            )
            .field(FormField::Make, [Rule::Required])
            .field(FormField::Model, [Rule::Required])
            .field(
                FormField::YearOfManufacture,
                [
                    Rule::Required,
                    Rule::pattern(&patterns::FOUR_DIGIT_YEAR, "Enter a four-digit year"),
                    Rule::ManufactureYear,
                ],
            )
            .field(
                FormField::EngineCapacity,
                [
                    Rule::pattern(&patterns::WHOLE_NUMBER, "Engine capacity must be a whole number of cc"),
                    Rule::range(dec!(50), dec!(10000)),
                ],
            )
            .field(FormField::VehicleValue, [Rule::Required, Rule::at_least(dec!(1))])
            .field(FormField::UsageType, [Rule::Required, Rule::OneOf(Choice::Usage)])
            .field(FormField::Insurer, [Rule::Required])
            .field(
                FormField::InsuranceDuration,
                [
                    Rule::Required,
                    Rule::pattern(&patterns::DIGITS, "Duration must be a whole number of months"),
                    Rule::range(dec!(1), dec!(12)),
                ],
            )
            .field(FormField::StartDate, [Rule::Required, Rule::Date, Rule::NotInPast])
            .field(FormField::ClaimsHistory, [Rule::OneOf(Choice::YesNo)])
            .field(FormField::Modifications, [Rule::OneOf(Choice::YesNo)]);

        let payment = StepRuleSet::new()
            .field(FormField::PaymentMethod, [Rule::Required, Rule::OneOf(Choice::Payment)])
            .field(
                FormField::PaymentPhone,
                [
                    Rule::RequiredWhen {
                        field: FormField::PaymentMethod,
                        when: is_mpesa,
                    },
                    Rule::pattern(&patterns::MOBILE_NUMBER, "Enter a valid M-Pesa number"),
                ],
            );

        Self::new(vec![
            StepDefinition::new(StepKind::PersonalDetails, personal),
            StepDefinition::new(StepKind::VehicleCoverage, vehicle).checking_underwriter(),
            StepDefinition::new(StepKind::Documents, StepRuleSet::new()).requiring_documents(),
            StepDefinition::new(StepKind::PremiumPayment, payment).rating_dependent(),
            StepDefinition::new(StepKind::Confirmation, StepRuleSet::new()),
        ])
    }

    /// Number of steps, N
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step at a 1-based index
    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// 1-based index of the first step of `kind`
    pub fn index_of(&self, kind: StepKind) -> Option<usize> {
        self.steps.iter().position(|s| s.kind == kind).map(|i| i + 1)
    }

    /// The step submission happens from
    pub fn submission_index(&self) -> usize {
        self.len().saturating_sub(1).max(1)
    }

    /// The terminal confirmation step
    pub fn confirmation_index(&self) -> usize {
        self.len()
    }
}

impl Default for FlowDefinition {
    fn default() -> Self {
        Self::motor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motor_flow_shape() {
        let flow = FlowDefinition::motor();
        assert_eq!(flow.len(), 5);
        assert_eq!(flow.submission_index(), 4);
        assert_eq!(flow.index_of(StepKind::Documents), Some(3));
        assert!(flow.step(4).unwrap().rating_dependent);
        assert!(flow.step(0).is_none());
        assert!(flow.step(6).is_none());
    }
}
