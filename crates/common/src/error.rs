//! Error types for Payform

use thiserror::Error;

/// Result type alias using Payform Error
pub type Result<T> = std::result::Result<T, Error>;

/// Payform error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown payment status: {0}")]
    UnknownStatus(String),

    #[error("Unknown payment flow: {0}")]
    UnknownFlow(String),

    #[error("Malformed expiry {month}/{year}")]
    MalformedExpiry { month: String, year: String },
}
