//! Cross-Field Validator
//!
//! Two independent, pure checks over a document's extracted fields:
//!
//! - **Pattern rules**: every field with a declared rule is checked and each
//!   failing field yields one message. Nothing short-circuits. A ruled field
//!   the extraction did not return is skipped.
//! - **Must-match**: each declared pair compares the named extracted field
//!   with its form field after normalization. If either side is absent the
//!   pair is skipped.
//!
//! Neither check touches the declared data; autofill from extracted values is
//! a separate, explicit workflow operation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use core_kernel::temporal::subtract_months;

use crate::document::Extraction;
use crate::schema::{DocumentSchema, FieldRule, Normalization};

/// Extraction confidence below which a warning is attached
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.9;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Result of document validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the document passed every check
    pub is_valid: bool,
    /// One message per failing check
    pub errors: Vec<String>,
    /// Non-fatal observations, such as low extraction confidence
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result with errors
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Read access to the proposer's declared form values by field key
pub trait DeclaredFields {
    /// The declared value of `form_field`, if any
    fn declared_value(&self, form_field: &str) -> Option<String>;
}

impl DeclaredFields for BTreeMap<String, String> {
    fn declared_value(&self, form_field: &str) -> Option<String> {
        self.get(form_field).cloned()
    }
}

impl DeclaredFields for HashMap<String, String> {
    fn declared_value(&self, form_field: &str) -> Option<String> {
        self.get(form_field).cloned()
    }
}

/// Runs both checks and attaches a confidence warning
pub fn validate_document(
    schema: &DocumentSchema,
    extraction: &Extraction,
    declared: &dyn DeclaredFields,
    today: NaiveDate,
) -> ValidationResult {
    let mut result = validate_patterns(schema, extraction, today);
    result.merge(cross_validate(schema, extraction, declared));

    if extraction.confidence < LOW_CONFIDENCE_THRESHOLD {
        result.add_warning(format!(
            "{} was read with low confidence ({:.0}%), please check the details",
            schema.document_type(),
            extraction.confidence * 100.0
        ));
    }

    if !result.is_valid {
        tracing::warn!(
            document_type = schema.document_type().key(),
            errors = result.errors.len(),
            "Document failed validation"
        );
    }
    result
}

/// Applies each field's declared rule to the fields the extraction returned
pub fn validate_patterns(schema: &DocumentSchema, extraction: &Extraction, today: NaiveDate) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for rule in schema.rules() {
        let field = rule.field.as_str();
        let Some(value) = extraction.field(field) else {
            continue;
        };

        match &rule.rule {
            FieldRule::Pattern(pattern) => {
                if !pattern.is_match(value) {
                    result.add_error(format!("Invalid {} format in document", field));
                }
            }
            FieldRule::Future => match parse_document_date(value) {
                Some(date) if date > today => {}
                Some(_) => result.add_error(format!("{} must be a future date", field)),
                None => result.add_error(format!("{} is not a valid date", field)),
            },
            FieldRule::Recent { months } => {
                let window_start = subtract_months(today, *months).unwrap_or(NaiveDate::MIN);
                match parse_document_date(value) {
                    Some(date) if date >= window_start && date <= today => {}
                    Some(_) => result.add_error(format!(
                        "{} must be from within the last {} months",
                        field, months
                    )),
                    None => result.add_error(format!("{} is not a valid date", field)),
                }
            }
        }
    }

    result
}

/// Compares each must-match pair, skipping pairs with an absent side
pub fn cross_validate(
    schema: &DocumentSchema,
    extraction: &Extraction,
    declared: &dyn DeclaredFields,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for pair in schema.must_match_pairs() {
        let Some(extracted) = extraction.field(&pair.extracted_field) else {
            continue;
        };
        let Some(declared) = declared
            .declared_value(&pair.form_field)
            .filter(|v| !v.trim().is_empty())
        else {
            continue;
        };

        let matches = match (
            normalize(extracted, pair.normalization),
            normalize(&declared, pair.normalization),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !matches {
            result.add_error(format!("Document data does not match form {}", pair.form_field));
        }
    }

    result
}

/// Parses a date in any of the formats printed on Kenyan documents
pub fn parse_document_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Canonical form of `value` under `normalization`, or `None` if the value
/// cannot be read that way
pub fn normalize(value: &str, normalization: Normalization) -> Option<String> {
    match normalization {
        Normalization::Text => Some(
            value
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        ),
        Normalization::Identifier => Some(
            value
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect::<String>()
                .to_uppercase(),
        ),
        Normalization::Numeric => {
            let digits: String = value.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            Decimal::from_str(&digits).ok().map(|d| d.normalize().to_string())
        }
        Normalization::Date => parse_document_date(value).map(|d| d.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize("  John   KAMAU ", Normalization::Text).unwrap(), "john kamau");
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize("kda 123-a", Normalization::Identifier).unwrap(), "KDA123A");
    }

    #[test]
    fn test_normalize_numeric() {
        assert_eq!(
            normalize("1,500", Normalization::Numeric),
            normalize("1500.00", Normalization::Numeric)
        );
        assert_eq!(normalize("about 1500", Normalization::Numeric), None);
    }

    #[test]
    fn test_parse_document_dates() {
        let expected = NaiveDate::from_ymd_opt(1990, 3, 15);
        assert_eq!(parse_document_date("1990-03-15"), expected);
        assert_eq!(parse_document_date("15/03/1990"), expected);
        assert_eq!(parse_document_date("15.03.1990"), expected);
        assert_eq!(parse_document_date("March 1990"), None);
    }

    #[test]
    fn test_result_merge() {
        let mut result = ValidationResult::ok();
        result.merge(ValidationResult::fail(vec!["a".to_string()]));
        result.add_error("b");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["a", "b"]);
    }
}
