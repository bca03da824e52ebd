//! Payment ledger validation and status derivation.
//!
//! # Modules
//!
//! - `types` - Payment domain types
//! - `error` - Payment-specific error types
//! - `service` - Candidate validation and post-payment status

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{Payment, PaymentCandidate, PaymentTypeInfo};
