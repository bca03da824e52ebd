//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::{has_at_most_two_decimals, is_valid_percentage};
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
