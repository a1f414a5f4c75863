//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_documents::{DocumentStatus, DocumentType};
use domain_quotation::{ErrorKey, QuotationDraft, QuotationEvent};
use domain_rating::PremiumBreakdown;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency().code(),
        expected.currency().code()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a breakdown's total is its basic premium plus its levies
pub fn assert_total_identity(breakdown: &PremiumBreakdown) {
    let expected = breakdown.basic_premium().amount() + breakdown.total_levies().amount();
    assert_eq!(
        breakdown.total_premium().amount(),
        expected,
        "Total {} is not basic {} plus levies {}",
        breakdown.total_premium(),
        breakdown.basic_premium(),
        breakdown.total_levies()
    );
}

/// Asserts that the draft holds exactly `message` under `key`
pub fn assert_error(draft: &QuotationDraft, key: ErrorKey, message: &str) {
    assert_eq!(
        draft.error(key),
        Some(message),
        "Unexpected error for {}; all errors: {:?}",
        key,
        draft.errors()
    );
}

/// Asserts the status of a document record
pub fn assert_document_status(draft: &QuotationDraft, document_type: DocumentType, expected: DocumentStatus) {
    let actual = draft.document(document_type).map(|record| record.status());
    assert_eq!(
        actual,
        Some(expected),
        "{} is {:?}, expected {:?}",
        document_type,
        actual,
        expected
    );
}

/// Asserts that `events` contain one matching `predicate` and returns it
pub fn assert_has_event<'a>(
    events: &'a [QuotationEvent],
    description: &str,
    predicate: impl Fn(&QuotationEvent) -> bool,
) -> &'a QuotationEvent {
    events
        .iter()
        .find(|event| predicate(event))
        .unwrap_or_else(|| panic!("No {} event among {:?}", description, events))
}
