//! Withholding tax calculation.
//!
//! # Modules
//!
//! - `withholding` - Tax amount and net payable derivation

pub mod withholding;

#[cfg(test)]
mod withholding_props;

pub use withholding::{RoundingMode, Withholding, withholding};
