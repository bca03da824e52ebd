//! Payment repository.
//!
//! Recording a payment takes a `FOR UPDATE` lock on the invoice row before
//! re-deriving the remaining balance, so two concurrent payments can never
//! both pass the balance check against a stale figure: the second writer
//! blocks until the first commits and then sees the reduced balance.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use remit_core::audit::{AuditAction, AuditEvent};
use remit_core::invoice::InvoiceFigures;
use remit_core::payment::{Payment, PaymentCandidate, PaymentService};
use remit_core::workflow::WorkflowService;
use remit_shared::types::{InvoiceId, UserId};

use crate::entities::payments;
use crate::repositories::audit::AuditLogRepository;
use crate::repositories::error::RepositoryError;
use crate::repositories::invoice::{
    Actor, figures_in_txn, find_for_update, payment_to_domain, to_domain, tombstone_of,
};
use crate::repositories::master_data::MasterDataRepository;

/// Outcome of recording a payment.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    /// The stored payment.
    pub payment: Payment,
    /// Figures after the insertion.
    pub figures: InvoiceFigures,
    /// Invoice status after the balance-driven recomputation.
    pub status: remit_core::invoice::InvoiceStatus,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment against an invoice.
    ///
    /// The validation pipeline runs in its fixed order against the balance
    /// observed under the row lock; on success the invoice status is
    /// recomputed purely from the new remaining balance.
    pub async fn record(
        &self,
        invoice_id: Uuid,
        candidate: PaymentCandidate,
        actor: Actor,
    ) -> Result<RecordedPayment, RepositoryError> {
        let today = Utc::now().date_naive();

        let txn = self.db.begin().await?;

        let model = find_for_update(&txn, invoice_id).await?;
        WorkflowService::guard_visible(&tombstone_of(&model))?;

        let invoice = to_domain(&model)?;
        let figures = figures_in_txn(&txn, &model).await?;

        let payment_type =
            MasterDataRepository::payment_type_info(&txn, candidate.payment_type_id.into_inner())
                .await?;

        PaymentService::validate(&candidate, figures.remaining_balance, today, &payment_type)?;

        let (tds_amount, tds_rounded) = PaymentService::withholding_snapshot(&invoice, &candidate);
        let now = Utc::now();

        let payment_model = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            amount_paid: Set(candidate.amount_paid),
            payment_date: Set(candidate.payment_date),
            payment_type_id: Set(candidate.payment_type_id.into_inner()),
            payment_reference: Set(candidate.payment_reference.clone()),
            tds_amount_applied: Set(tds_amount),
            tds_rounded: Set(tds_rounded),
            created_by: Set(actor.user_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let remaining_after = figures.remaining_balance - candidate.amount_paid;
        let new_status = PaymentService::status_after(
            figures.net_payable,
            remaining_after,
            invoice.status,
        );

        let mut active = model.into_active_model();
        active.status = Set(new_status.into());
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;

        AuditLogRepository::new(self.db.clone())
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(invoice_id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::PaymentRecorded,
                before: None,
                after: serde_json::to_value(&payment_model).ok(),
            })
            .await;

        Ok(RecordedPayment {
            payment: payment_to_domain(&payment_model),
            figures: InvoiceFigures {
                remaining_balance: remaining_after,
                total_paid: figures.total_paid + candidate.amount_paid,
                ..figures
            },
            status: new_status,
        })
    }

    /// Lists payments for one invoice, oldest first.
    pub async fn list(&self, invoice_id: Uuid) -> Result<Vec<Payment>, RepositoryError> {
        let models = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.iter().map(payment_to_domain).collect())
    }
}
