//! Purge sweep: permanent removal of soft-deleted invoices whose recovery
//! deadline has elapsed.
//!
//! The sweep is best-effort per invoice: one failing cascade is recorded
//! and the loop continues, so a poisoned record cannot wedge the whole
//! run. Re-running the sweep over an invoice that is already gone deletes
//! zero rows and reports success, which keeps the job idempotent. Only an
//! inability to query the candidate set fails the run itself.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use remit_core::storage::StorageService;

use crate::entities::{attachments, audit_log, credit_notes, invoices, payments};
use crate::repositories::error::RepositoryError;

/// One invoice the sweep failed to remove.
#[derive(Debug, Clone)]
pub struct PurgeFailure {
    /// The invoice that could not be purged.
    pub invoice_id: Uuid,
    /// Why.
    pub error: String,
}

/// Result of one sweep run.
#[derive(Debug)]
pub struct PurgeOutcome {
    /// Invoices permanently removed.
    pub purged: u64,
    /// Invoices that failed and will be retried next run.
    pub failed: Vec<PurgeFailure>,
    /// Eligible invoices still waiting after this run.
    pub remaining: u64,
}

/// Purge repository.
#[derive(Clone)]
pub struct PurgeRepository {
    db: DatabaseConnection,
    storage: Option<Arc<StorageService>>,
}

impl PurgeRepository {
    /// Creates a new purge repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, storage: Option<Arc<StorageService>>) -> Self {
        Self { db, storage }
    }

    /// Runs one bounded sweep, oldest deletions first.
    pub async fn sweep(&self, batch_size: u64) -> Result<PurgeOutcome, RepositoryError> {
        let now = Utc::now();

        let candidates = invoices::Entity::find()
            .filter(invoices::Column::IsHidden.eq(true))
            .filter(invoices::Column::DeletedAt.is_not_null())
            .filter(invoices::Column::RecoveryDeadline.lte(now))
            .order_by_asc(invoices::Column::DeletedAt)
            .limit(batch_size)
            .all(&self.db)
            .await?;

        let mut purged = 0u64;
        let mut failed = Vec::new();

        for model in candidates {
            match self.purge_one(model.id).await {
                Ok(()) => purged += 1,
                Err(e) => {
                    warn!(invoice_id = %model.id, error = %e, "purge failed for invoice");
                    failed.push(PurgeFailure {
                        invoice_id: model.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let remaining = invoices::Entity::find()
            .filter(invoices::Column::IsHidden.eq(true))
            .filter(invoices::Column::DeletedAt.is_not_null())
            .filter(invoices::Column::RecoveryDeadline.lte(now))
            .count(&self.db)
            .await?;

        info!(purged, failed = failed.len(), remaining, "purge sweep finished");

        Ok(PurgeOutcome {
            purged,
            failed,
            remaining,
        })
    }

    /// Cascade-deletes one invoice: audit entries, attachments, payments,
    /// credit notes, then the invoice row itself.
    ///
    /// Deleting an invoice that is already gone removes zero rows and
    /// succeeds.
    pub async fn purge_one(&self, invoice_id: Uuid) -> Result<(), RepositoryError> {
        let attachment_rows = attachments::Entity::find()
            .filter(attachments::Column::InvoiceId.eq(invoice_id))
            .all(&self.db)
            .await?;

        let txn = self.db.begin().await?;

        audit_log::Entity::delete_many()
            .filter(audit_log::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await?;

        attachments::Entity::delete_many()
            .filter(attachments::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await?;

        payments::Entity::delete_many()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await?;

        credit_notes::Entity::delete_many()
            .filter(credit_notes::Column::InvoiceId.eq(invoice_id))
            .exec(&txn)
            .await?;

        invoices::Entity::delete_by_id(invoice_id).exec(&txn).await?;

        txn.commit().await?;

        // Storage objects go after the rows are gone; a leftover object is
        // recoverable garbage, a dangling row is not.
        if let Some(storage) = self.storage.as_deref() {
            for attachment in attachment_rows {
                if let Err(e) = storage.delete(&attachment.storage_key).await {
                    warn!(
                        invoice_id = %invoice_id,
                        storage_key = %attachment.storage_key,
                        error = %e,
                        "orphaned storage object left behind"
                    );
                }
            }
        }

        Ok(())
    }
}
