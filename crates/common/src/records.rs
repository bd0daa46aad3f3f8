//! Payment and order rows written by the application under test

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Purchase flow offered on the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFlow {
    /// "Купить": pay by card
    Debit,
    /// "Купить в кредит": credit by card details
    Credit,
}

impl PaymentFlow {
    pub const ALL: [PaymentFlow; 2] = [PaymentFlow::Debit, PaymentFlow::Credit];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFlow::Debit => "debit",
            PaymentFlow::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFlow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" | "card" => Ok(PaymentFlow::Debit),
            "credit" => Ok(PaymentFlow::Credit),
            other => Err(Error::UnknownFlow(other.to_string())),
        }
    }
}

/// Status the bank simulator assigned to a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Approved,
    Declined,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Declined => "DECLINED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "APPROVED" => Ok(PaymentStatus::Approved),
            "DECLINED" => Ok(PaymentStatus::Declined),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// Newest row of the payment (or credit request) table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub status: PaymentStatus,
    pub bank_id: Option<String>,
}

/// Newest row of the order table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Value of the column linking the order to its payment
    pub payment_id: Option<String>,
}

impl OrderRecord {
    /// Whether this order points at `payment`
    pub fn links_to(&self, payment: &PaymentRecord) -> bool {
        match (&self.payment_id, &payment.bank_id) {
            (Some(order), Some(bank)) => order == bank,
            _ => false,
        }
    }
}
