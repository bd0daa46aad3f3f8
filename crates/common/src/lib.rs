//! Payform Common Library
//!
//! Card fixtures, the fixture generator, and the payment/order record types
//! shared by the E2E suite.

pub mod card;
pub mod error;
pub mod generator;
pub mod messages;
pub mod records;

// Re-export commonly used types
pub use card::{CardField, CardInfo, CardMonthAndYear};
pub use error::{Error, Result};
pub use generator::DataGenerator;
pub use records::{OrderRecord, PaymentFlow, PaymentRecord, PaymentStatus};

/// Payform version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
