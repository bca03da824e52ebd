//! Credit note preparation and proportional tax reversal.
//!
//! # Modules
//!
//! - `types` - Credit note domain types
//! - `error` - Credit-note-specific error types
//! - `service` - Candidate preparation and reversal math

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CreditNoteError;
pub use service::CreditNoteService;
pub use types::{CreditNote, CreditNoteCandidate, PreparedCreditNote};
