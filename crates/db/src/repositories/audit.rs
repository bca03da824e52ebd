//! Audit log repository and the fire-and-forget recording helper.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set};
use tracing::warn;
use uuid::Uuid;

use remit_core::audit::{AuditError, AuditEvent, AuditSink};

use crate::entities::audit_log;
use crate::repositories::error::RepositoryError;

/// Repository persisting audit events to the `audit_log` table.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists audit entries for one invoice, newest first.
    pub async fn list_for_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<audit_log::Model>, RepositoryError> {
        Ok(audit_log::Entity::find()
            .filter(audit_log::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(audit_log::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Records an event, logging and swallowing any sink failure.
    ///
    /// The audit trail is best-effort: a broken sink must never fail the
    /// primary operation it describes.
    pub async fn record_best_effort(&self, event: AuditEvent) {
        let invoice_id = event.invoice_id;
        if let Err(e) = self.record(event).await {
            warn!(invoice_id = %invoice_id, error = %e, "audit sink failure ignored");
        }
    }
}

impl AuditSink for AuditLogRepository {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let entry = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(event.invoice_id.into_inner()),
            actor_id: Set(event.actor_id.into_inner()),
            action: Set(event.action.as_str().to_string()),
            before_snapshot: Set(event.before),
            after_snapshot: Set(event.after),
            created_at: Set(Utc::now().into()),
        };

        entry
            .insert(&self.db)
            .await
            .map(|_| ())
            .map_err(|e| AuditError(e.to_string()))
    }
}
