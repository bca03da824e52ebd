//! Invoice records, status, and derived figures.
//!
//! # Modules
//!
//! - `types` - Invoice domain types (status, kind, tombstone)
//! - `figures` - The single derivation point for balance figures

pub mod figures;
pub mod types;

#[cfg(test)]
mod figures_props;

pub use figures::InvoiceFigures;
pub use types::{
    Hold, Invoice, InvoiceKind, InvoiceStatus, Rejection, Tombstone, WithholdingConfig,
};
