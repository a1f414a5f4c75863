//! Compiled field patterns for Kenyan motor proposals
//!
//! Shared by document schemas and by the form step rules, so a registration
//! number typed into the form and one read from a logbook are held to the
//! same format.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in field pattern is valid")
}

/// Vehicle registration, e.g. `KDA 123A` or `KBZ123X`
pub static REGISTRATION_NUMBER: Lazy<Regex> =
    Lazy::new(|| compile(r"^K[A-Z]{2,3}\s?\d{3}[A-Z]$"));

/// National identity card number: 7 or 8 digits
pub static NATIONAL_ID_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"^\d{7,8}$"));

/// KRA personal identification number, e.g. `A123456789K`
pub static KRA_PIN: Lazy<Regex> = Lazy::new(|| compile(r"^[A-Z]\d{9}[A-Z]$"));

/// Driving licence number, e.g. `DL12345ABC`
pub static DRIVING_LICENSE_NUMBER: Lazy<Regex> =
    Lazy::new(|| compile(r"^[A-Z]{2}\d{5}[A-Z]{3}$"));

/// Chassis number: 11 to 17 VIN characters (no I, O or Q)
pub static CHASSIS_NUMBER: Lazy<Regex> =
    Lazy::new(|| compile(r"^[A-HJ-NPR-Z0-9]{11,17}$"));

/// Safaricom/Airtel mobile number in local or international form
pub static MOBILE_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"^(0|\+254|254)7\d{8}$"));

pub static EMAIL: Lazy<Regex> = Lazy::new(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

/// Letters, spaces, apostrophes and hyphens
pub static PERSON_NAME: Lazy<Regex> = Lazy::new(|| compile(r"^[A-Za-z][A-Za-z\s'\-]*$"));

pub static FOUR_DIGIT_YEAR: Lazy<Regex> = Lazy::new(|| compile(r"^\d{4}$"));

pub static DIGITS: Lazy<Regex> = Lazy::new(|| compile(r"^\d+$"));

/// Whole number, optionally with comma thousands separators (`1,500`)
pub static WHOLE_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"^(\d+|\d{1,3}(,\d{3})+)$"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_numbers() {
        assert!(REGISTRATION_NUMBER.is_match("KDA 123A"));
        assert!(REGISTRATION_NUMBER.is_match("KCB456Z"));
        assert!(!REGISTRATION_NUMBER.is_match("UAX 123A"));
        assert!(!REGISTRATION_NUMBER.is_match("KDA 12A"));
    }

    #[test]
    fn test_identity_numbers() {
        assert!(NATIONAL_ID_NUMBER.is_match("12345678"));
        assert!(!NATIONAL_ID_NUMBER.is_match("123456"));
        assert!(KRA_PIN.is_match("A123456789K"));
        assert!(!KRA_PIN.is_match("A12345678K"));
        assert!(DRIVING_LICENSE_NUMBER.is_match("DL12345ABC"));
        assert!(CHASSIS_NUMBER.is_match("JT123456789"));
        assert!(!CHASSIS_NUMBER.is_match("JTO23456789"));
    }

    #[test]
    fn test_contact_patterns() {
        assert!(MOBILE_NUMBER.is_match("0712345678"));
        assert!(MOBILE_NUMBER.is_match("+254712345678"));
        assert!(!MOBILE_NUMBER.is_match("0612345678"));
        assert!(EMAIL.is_match("wanjiku@example.co.ke"));
        assert!(!EMAIL.is_match("wanjiku@example"));
        assert!(PERSON_NAME.is_match("Wanjiku O'Neill-Kamau"));
        assert!(!PERSON_NAME.is_match("R2D2"));
    }

    #[test]
    fn test_whole_numbers() {
        assert!(WHOLE_NUMBER.is_match("1500"));
        assert!(WHOLE_NUMBER.is_match("1,500"));
        assert!(!WHOLE_NUMBER.is_match("2.5"));
        assert!(!WHOLE_NUMBER.is_match("15,00"));
        assert!(DIGITS.is_match("10"));
        assert!(!DIGITS.is_match("2.5"));
    }
}
