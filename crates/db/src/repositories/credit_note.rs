//! Credit note repository.
//!
//! Credit notes are append-only reductions of an invoice's net payable.
//! Recording one can settle the invoice outright, so the status is
//! recomputed from the new remaining balance under the same row lock the
//! payment path uses.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use remit_core::audit::{AuditAction, AuditEvent};
use remit_core::credit::{CreditNote, CreditNoteCandidate, CreditNoteService};
use remit_core::invoice::InvoiceFigures;
use remit_core::payment::PaymentService;
use remit_core::workflow::WorkflowService;
use remit_shared::types::{InvoiceId, UserId};

use crate::entities::credit_notes;
use crate::repositories::audit::AuditLogRepository;
use crate::repositories::error::RepositoryError;
use crate::repositories::invoice::{
    Actor, credit_to_domain, figures_in_txn, find_for_update, to_domain, tombstone_of,
};

/// Outcome of recording a credit note.
#[derive(Debug, Clone)]
pub struct RecordedCreditNote {
    /// The stored credit note.
    pub credit_note: CreditNote,
    /// Figures after the insertion (balance clamped at zero).
    pub figures: InvoiceFigures,
    /// Invoice status after the balance-driven recomputation.
    pub status: remit_core::invoice::InvoiceStatus,
    /// True when the credited amount exceeded the remaining balance at
    /// recording time; surfaced to the caller as a warning.
    pub exceeds_balance: bool,
}

/// Credit note repository.
#[derive(Debug, Clone)]
pub struct CreditNoteRepository {
    db: DatabaseConnection,
}

impl CreditNoteRepository {
    /// Creates a new credit note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a credit note against an invoice.
    pub async fn record(
        &self,
        invoice_id: Uuid,
        candidate: CreditNoteCandidate,
        actor: Actor,
    ) -> Result<RecordedCreditNote, RepositoryError> {
        let today = Utc::now().date_naive();

        let txn = self.db.begin().await?;

        let model = find_for_update(&txn, invoice_id).await?;
        WorkflowService::guard_visible(&tombstone_of(&model))?;

        let invoice = to_domain(&model)?;
        let figures = figures_in_txn(&txn, &model).await?;

        let prepared =
            CreditNoteService::prepare(&candidate, &invoice, figures.remaining_balance, today)?;
        let now = Utc::now();

        let credit_model = credit_notes::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            amount: Set(prepared.amount),
            reason: Set(prepared.reason.clone()),
            tds_applicable: Set(prepared.tds_applicable),
            tds_amount: Set(prepared.tds_amount),
            credit_note_date: Set(prepared.credit_note_date),
            attachment_id: Set(prepared.attachment_id.map(remit_shared::types::AttachmentId::into_inner)),
            created_by: Set(actor.user_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let remaining_after =
            (figures.remaining_balance - prepared.amount).max(rust_decimal::Decimal::ZERO);
        let new_status =
            PaymentService::status_after(figures.net_payable, remaining_after, invoice.status);

        let mut active = model.into_active_model();
        active.status = Set(new_status.into());
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;

        AuditLogRepository::new(self.db.clone())
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(invoice_id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::CreditNoteRecorded,
                before: None,
                after: serde_json::to_value(&credit_model).ok(),
            })
            .await;

        Ok(RecordedCreditNote {
            credit_note: credit_to_domain(&credit_model),
            figures: InvoiceFigures {
                remaining_balance: remaining_after,
                total_credited: figures.total_credited + prepared.amount,
                ..figures
            },
            status: new_status,
            exceeds_balance: prepared.exceeds_balance,
        })
    }

    /// Lists credit notes for one invoice, oldest first.
    pub async fn list(&self, invoice_id: Uuid) -> Result<Vec<CreditNote>, RepositoryError> {
        let models = credit_notes::Entity::find()
            .filter(credit_notes::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(credit_notes::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.iter().map(credit_to_domain).collect())
    }
}
