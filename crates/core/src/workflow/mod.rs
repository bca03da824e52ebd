//! Invoice lifecycle state machine.
//!
//! Every role-gated transition rule lives behind one set of pure functions
//! here; call sites never re-derive who may do what.
//!
//! # Modules
//!
//! - `types` - Actor roles and workflow action variants
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{ActorRole, WorkflowAction};
