//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Repositories orchestrate the pure logic in `remit-core` inside
//! database transactions; every multi-step invoice write happens inside
//! one transaction scoped to a single invoice.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CreditNoteRepository, InvoiceRepository, MasterDataRepository, PaymentRepository,
    PurgeRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
