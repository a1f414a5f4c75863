//! Payment selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WorkflowError;
use crate::fields::FormField;

/// How the proposer pays the premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// M-Pesa STK push to the payment phone number
    Mpesa,
    Card,
    BankTransfer,
}

impl PaymentMethod {
    pub fn key(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Returns true if this method needs a mobile number to charge
    pub fn requires_phone(&self) -> bool {
        matches!(self, PaymentMethod::Mpesa)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaymentMethod {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mpesa" | "m-pesa" => Ok(PaymentMethod::Mpesa),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            _ => Err(WorkflowError::UnknownField(format!(
                "{}={}",
                FormField::PaymentMethod.key(),
                s
            ))),
        }
    }
}

/// The selected payment method and, for M-Pesa, the number to charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethod,
    pub phone: Option<String>,
}

/// Returns true if `value` selects M-Pesa
pub(crate) fn is_mpesa(value: &str) -> bool {
    value
        .parse::<PaymentMethod>()
        .map(|m| m.requires_phone())
        .unwrap_or(false)
}
