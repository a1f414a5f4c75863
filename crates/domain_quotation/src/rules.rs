//! Declarative step validation
//!
//! Each step lists its fields and the rules they must satisfy. One generic
//! validator walks the list, so every step is checked the same way:
//!
//! - a field reports at most one message, from its first failing rule
//! - every field is checked, nothing short-circuits across fields
//! - rules other than `Required` and `RequiredWhen` pass on an empty value
//!
//! ```rust,ignore
//! let rules = StepRuleSet::new()
//!     .field(FormField::OwnerEmail, [Rule::Required, Rule::pattern(&EMAIL, "Enter a valid email address")]);
//! let errors = rules.validate(&form, today);
//! ```

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use core_kernel::temporal::age_on;
use domain_documents::parse_document_date;
use domain_rating::{ProductCode, UsageType, VehicleCategory, EARLIEST_MANUFACTURE_YEAR};

use crate::error::StepError;
use crate::fields::{parse_amount, parse_yes_no, ErrorKey, FormField};
use crate::payment::PaymentMethod;

/// A closed set of accepted values, checked by parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Product,
    Usage,
    Category,
    Payment,
    YesNo,
}

impl Choice {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Choice::Product => value.parse::<ProductCode>().is_ok(),
            Choice::Usage => value.parse::<UsageType>().is_ok(),
            Choice::Category => value.parse::<VehicleCategory>().is_ok(),
            Choice::Payment => value.parse::<PaymentMethod>().is_ok(),
            Choice::YesNo => parse_yes_no(value).is_some(),
        }
    }
}

/// A rule on one form field
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    Pattern {
        pattern: &'static Lazy<Regex>,
        message: &'static str,
    },
    NumericRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    OneOf(Choice),
    /// Any accepted document date format
    Date,
    /// A date on or after today
    NotInPast,
    /// Between 1950 and next year's model year
    ManufactureYear,
    /// A date of birth at least this many years ago
    MinimumAge(u32),
    /// Required when `field`'s value satisfies `when`
    RequiredWhen {
        field: FormField,
        when: fn(&str) -> bool,
    },
}

impl Rule {
    pub fn pattern(pattern: &'static Lazy<Regex>, message: &'static str) -> Self {
        Rule::Pattern { pattern, message }
    }

    pub fn range(min: Decimal, max: Decimal) -> Self {
        Rule::NumericRange {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: Decimal) -> Self {
        Rule::NumericRange {
            min: Some(min),
            max: None,
        }
    }

    /// Checks `value` of `field`; `form` is consulted by cross-field rules
    fn check(
        &self,
        field: FormField,
        value: Option<&str>,
        form: &BTreeMap<FormField, String>,
        today: NaiveDate,
    ) -> Result<(), String> {
        let required = || format!("{} is required", field.label());

        let value = match (self, value) {
            (Rule::Required, None) => return Err(required()),
            (Rule::RequiredWhen { field: other, when }, None) => {
                let triggered = read(form, *other).map(|v| when(v)).unwrap_or(false);
                return if triggered { Err(required()) } else { Ok(()) };
            }
            (_, None) => return Ok(()),
            (_, Some(value)) => value,
        };

        match self {
            Rule::Required | Rule::RequiredWhen { .. } => Ok(()),
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    Err(format!("{} must be at least {} characters", field.label(), min))
                } else {
                    Ok(())
                }
            }
            Rule::Pattern { pattern, message } => {
                if pattern.is_match(value) {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
            Rule::NumericRange { min, max } => {
                let number = parse_amount(value).ok_or_else(|| format!("{} must be a number", field.label()))?;
                if let Some(min) = min {
                    if number < *min {
                        return Err(format!("{} must be at least {}", field.label(), min));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(format!("{} must be at most {}", field.label(), max));
                    }
                }
                Ok(())
            }
            Rule::OneOf(choice) => {
                if choice.accepts(value) {
                    Ok(())
                } else {
                    Err(format!("Select a valid {}", field.label().to_lowercase()))
                }
            }
            Rule::Date => parse_document_date(value)
                .map(|_| ())
                .ok_or_else(|| format!("{} must be a valid date", field.label())),
            Rule::NotInPast => match parse_document_date(value) {
                Some(date) if date < today => Err(format!("{} cannot be in the past", field.label())),
                _ => Ok(()),
            },
            Rule::ManufactureYear => {
                let latest = today.year() + 1;
                match value.parse::<i32>() {
                    Ok(year) if (EARLIEST_MANUFACTURE_YEAR..=latest).contains(&year) => Ok(()),
                    _ => Err(format!(
                        "{} must be between {} and {}",
                        field.label(),
                        EARLIEST_MANUFACTURE_YEAR,
                        latest
                    )),
                }
            }
            Rule::MinimumAge(years) => match parse_document_date(value) {
                Some(born) if age_on(born, today) < *years => {
                    Err(format!("You must be at least {} years old", years))
                }
                _ => Ok(()),
            },
        }
    }
}

/// The rules of one field
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub field: FormField,
    pub rules: Vec<Rule>,
}

/// The field rules of one step
#[derive(Debug, Clone, Default)]
pub struct StepRuleSet {
    fields: Vec<FieldRules>,
}

impl StepRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FormField, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push(FieldRules {
            field,
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates every field of the step against `form`
    pub fn validate(&self, form: &BTreeMap<FormField, String>, today: NaiveDate) -> Vec<StepError> {
        self.fields
            .iter()
            .filter_map(|entry| {
                let value = read(form, entry.field);
                entry
                    .rules
                    .iter()
                    .find_map(|rule| rule.check(entry.field, value, form, today).err())
                    .map(|message| StepError::new(ErrorKey::Field(entry.field), message))
            })
            .collect()
    }
}

/// The trimmed, non-empty value of `field`
pub(crate) fn read(form: &BTreeMap<FormField, String>, field: FormField) -> Option<&str> {
    form.get(&field).map(|v| v.trim()).filter(|v| !v.is_empty())
}
