//! Repository abstractions for data access.
//!
//! Repositories are the lifecycle orchestrator: they run the pure rules
//! from `remit-core` inside database transactions, enforce duplicate and
//! master-data checks, and emit audit events after commit.

pub mod audit;
pub mod credit_note;
pub mod error;
pub mod invoice;
pub mod master_data;
pub mod payment;
pub mod purge;

pub use audit::AuditLogRepository;
pub use credit_note::CreditNoteRepository;
pub use error::RepositoryError;
pub use invoice::InvoiceRepository;
pub use master_data::MasterDataRepository;
pub use payment::PaymentRepository;
pub use purge::PurgeRepository;
