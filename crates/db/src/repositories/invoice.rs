//! Invoice repository: the lifecycle orchestrator.
//!
//! Every multi-step write (validation, master-data checks, duplicate
//! scope, status derivation, child inserts, attachment storage) happens
//! inside one database transaction scoped to a single invoice. The
//! duplicate pre-check runs in the same snapshot as the insert, and the
//! partial unique indexes close the remaining race at the storage layer.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use remit_core::audit::{AuditAction, AuditEvent};
use remit_core::credit::CreditNote;
use remit_core::invoice::{
    Hold, Invoice, InvoiceFigures, InvoiceKind, Rejection, Tombstone, WithholdingConfig,
};
use remit_core::payment::{Payment, PaymentCandidate, PaymentService};
use remit_core::storage::{StorageService, UploadInput};
use remit_core::validate::{
    FieldError, Validation, amount_positive, due_on_or_after_invoice_date, max_two_decimals,
    non_blank, period_ordered, withholding_percentage,
};
use remit_core::workflow::{ActorRole, WorkflowAction, WorkflowService};
use remit_shared::types::{
    AttachmentId, CategoryId, CreditNoteId, CurrencyId, EntityId, InvoiceId, InvoiceProfileId,
    PaymentId, PaymentTypeId, UserId, VendorId,
};

use crate::entities::{attachments, credit_notes, invoices, payments};
use crate::repositories::audit::AuditLogRepository;
use crate::repositories::error::RepositoryError;
use crate::repositories::master_data::MasterDataRepository;

/// The authenticated actor performing an operation.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// Resolved user ID.
    pub user_id: Uuid,
    /// Resolved role.
    pub role: ActorRole,
}

impl Actor {
    /// Returns true when the actor created the given invoice.
    #[must_use]
    pub fn owns(&self, invoice: &invoices::Model) -> bool {
        invoice.created_by == self.user_id
    }
}

/// An uploaded file to attach inside the write transaction.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// File bytes.
    pub bytes: Vec<u8>,
}

/// Master-data binding for a new invoice.
#[derive(Debug, Clone)]
pub enum CreateInvoiceKind {
    /// Standalone invoice carrying its own references.
    Standard {
        /// Vendor the invoice was received from.
        vendor_id: Uuid,
        /// Billing entity.
        entity_id: Uuid,
        /// Expense category.
        category_id: Uuid,
        /// Currency.
        currency_id: Uuid,
        /// Free-text description; part of the duplicate scope.
        description: String,
    },
    /// Recurring invoice bound to a profile.
    Recurring {
        /// The profile; fixes vendor/entity/category/currency.
        profile_id: Uuid,
        /// Billing period start.
        period_start: NaiveDate,
        /// Billing period end.
        period_end: NaiveDate,
    },
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Free-text invoice number.
    pub invoice_number: String,
    /// Master-data binding.
    pub kind: CreateInvoiceKind,
    /// Date on the vendor's document.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Gross amount.
    pub invoice_amount: Decimal,
    /// Whether withholding applies.
    pub tds_applicable: bool,
    /// Withholding percentage, required iff applicable.
    pub tds_percentage: Option<Decimal>,
    /// Ceiling rounding preference.
    pub tds_rounded: bool,
    /// When present, the invoice is created already paid and this payment
    /// is recorded in the same transaction.
    pub initial_payment: Option<PaymentCandidate>,
    /// Backing document stored inside the transaction.
    pub attachment: Option<AttachmentUpload>,
}

/// Field updates for an existing invoice.
///
/// The recurring/standalone binding is fixed for the record's lifetime;
/// only details within the stored kind can change.
#[derive(Debug, Clone)]
pub struct UpdateInvoiceInput {
    /// Free-text invoice number.
    pub invoice_number: String,
    /// Date on the vendor's document.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Gross amount.
    pub invoice_amount: Decimal,
    /// Whether withholding applies.
    pub tds_applicable: bool,
    /// Withholding percentage, required iff applicable.
    pub tds_percentage: Option<Decimal>,
    /// Ceiling rounding preference.
    pub tds_rounded: bool,
    /// Kind-specific detail updates.
    pub details: UpdateInvoiceDetails,
    /// Replacement backing document, stored inside the transaction.
    pub attachment: Option<AttachmentUpload>,
}

/// Kind-specific updatable details.
#[derive(Debug, Clone)]
pub enum UpdateInvoiceDetails {
    /// Details of a standalone invoice.
    Standard {
        /// Billing entity.
        entity_id: Uuid,
        /// Expense category.
        category_id: Uuid,
        /// Currency.
        currency_id: Uuid,
        /// Free-text description.
        description: String,
    },
    /// Details of a recurring invoice.
    Recurring {
        /// Billing period start.
        period_start: NaiveDate,
        /// Billing period end.
        period_end: NaiveDate,
    },
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<remit_core::invoice::InvoiceStatus>,
    /// Filter by vendor.
    pub vendor_id: Option<Uuid>,
    /// Include soft-deleted invoices (default: hidden are excluded).
    pub include_hidden: bool,
}

/// An invoice with its child ledgers and derived figures.
#[derive(Debug, Clone)]
pub struct InvoiceWithFigures {
    /// The invoice.
    pub invoice: Invoice,
    /// Recorded payments, oldest first.
    pub payments: Vec<Payment>,
    /// Recorded credit notes, oldest first.
    pub credit_notes: Vec<CreditNote>,
    /// Derived balance figures.
    pub figures: InvoiceFigures,
}

/// Invoice repository for lifecycle operations.
#[derive(Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    storage: Option<Arc<StorageService>>,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, storage: Option<Arc<StorageService>>) -> Self {
        Self { db, storage }
    }

    fn audit(&self) -> AuditLogRepository {
        AuditLogRepository::new(self.db.clone())
    }

    // ========================================================================
    // Create / update
    // ========================================================================

    /// Creates an invoice.
    ///
    /// Runs the validation pipeline, verifies master data, enforces the
    /// scoped duplicate rule, derives the initial status through the state
    /// machine, and persists the invoice together with any initial payment
    /// and attachment in one transaction.
    pub async fn create(
        &self,
        input: CreateInvoiceInput,
        actor: Actor,
    ) -> Result<InvoiceWithFigures, RepositoryError> {
        let today = Utc::now().date_naive();
        validate_create(&input)?;

        let txn = self.db.begin().await?;

        // Master data must exist and be active in the same snapshot as the
        // write.
        let (vendor_id, kind) = resolve_kind(&txn, &input.kind).await?;

        ensure_unique_scope(
            &txn,
            &input.invoice_number,
            vendor_id,
            &kind,
            None,
        )
        .await?;

        let is_paid = input.initial_payment.is_some();
        let status = WorkflowService::initial_status(actor.role, is_paid);
        let now = Utc::now();

        let invoice = Invoice {
            id: InvoiceId::new(),
            invoice_number: input.invoice_number.trim().to_string(),
            vendor_id: VendorId::from_uuid(vendor_id),
            kind,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            amount: input.invoice_amount,
            withholding: WithholdingConfig {
                applicable: input.tds_applicable,
                percentage: input.tds_percentage,
                rounded: input.tds_rounded,
            },
            status,
            rejection: None,
            hold: None,
            tombstone: Tombstone::Active,
            attachment_id: None,
            created_by: UserId::from_uuid(actor.user_id),
            created_at: now,
            updated_at: now,
        };

        let model = to_active_model(&invoice)
            .insert(&txn)
            .await
            .map_err(|e| map_unique_violation(e, &invoice.kind))?;

        // The backing document lands inside the transaction: a storage
        // failure aborts the whole creation, never leaving an invoice
        // without its expected document.
        let model = if let Some(upload) = input.attachment {
            self.attach(&txn, model, upload, actor.user_id).await?
        } else {
            model
        };

        if let Some(candidate) = input.initial_payment {
            let payment_type =
                MasterDataRepository::payment_type_info(&txn, candidate.payment_type_id.into_inner())
                    .await?;
            PaymentService::validate(&candidate, invoice.net_payable(), today, &payment_type)?;

            let (tds_amount, tds_rounded) =
                PaymentService::withholding_snapshot(&invoice, &candidate);
            payments::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(model.id),
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
        }

        txn.commit().await?;

        self.audit()
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(model.id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::Created,
                before: None,
                after: serde_json::to_value(&model).ok(),
            })
            .await;

        self.get(model.id).await
    }

    /// Updates an invoice's fields.
    ///
    /// Standard-user edits send the invoice back through approval;
    /// administrator edits never change its status.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
        actor: Actor,
    ) -> Result<InvoiceWithFigures, RepositoryError> {
        validate_update(&input)?;

        let txn = self.db.begin().await?;

        let model = find_for_update(&txn, id).await?;
        WorkflowService::guard_visible(&tombstone_of(&model))?;

        let new_status =
            WorkflowService::edit_outcome(model.status.clone().into(), actor.role, actor.owns(&model))?;

        let before = serde_json::to_value(&model).ok();

        let kind = resolve_update_details(&txn, &model, &input.details).await?;
        ensure_unique_scope(&txn, &input.invoice_number, model.vendor_id, &kind, Some(id)).await?;

        let mut active = model.clone().into_active_model();
        active.invoice_number = Set(input.invoice_number.trim().to_string());
        active.invoice_date = Set(input.invoice_date);
        active.due_date = Set(input.due_date);
        active.invoice_amount = Set(input.invoice_amount);
        active.tds_applicable = Set(input.tds_applicable);
        active.tds_percentage = Set(input.tds_percentage);
        active.tds_rounded = Set(input.tds_rounded);
        match &input.details {
            UpdateInvoiceDetails::Standard {
                entity_id,
                category_id,
                currency_id,
                description,
            } => {
                active.entity_id = Set(Some(*entity_id));
                active.category_id = Set(Some(*category_id));
                active.currency_id = Set(Some(*currency_id));
                active.description = Set(Some(description.trim().to_string()));
            }
            UpdateInvoiceDetails::Recurring {
                period_start,
                period_end,
            } => {
                active.period_start = Set(Some(*period_start));
                active.period_end = Set(Some(*period_end));
            }
        }
        if let Some(status) = new_status {
            active.status = Set(status.into());
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&txn)
            .await
            .map_err(|e| map_unique_violation(e, &kind))?;

        let model = if let Some(upload) = input.attachment {
            self.attach(&txn, model, upload, actor.user_id).await?
        } else {
            model
        };

        txn.commit().await?;

        self.audit()
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(model.id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::Updated,
                before,
                after: serde_json::to_value(&model).ok(),
            })
            .await;

        self.get(model.id).await
    }

    /// Stores an upload and links it to the invoice, inside the caller's
    /// transaction.
    async fn attach(
        &self,
        txn: &DatabaseTransaction,
        model: invoices::Model,
        upload: AttachmentUpload,
        uploaded_by: Uuid,
    ) -> Result<invoices::Model, RepositoryError> {
        let storage = self
            .storage
            .as_deref()
            .ok_or_else(|| RepositoryError::Storage(
                remit_core::storage::StorageError::configuration("no storage backend configured"),
            ))?;

        let attachment_id = Uuid::new_v4();
        let stored = storage
            .store(UploadInput {
                invoice_id: model.id,
                attachment_id,
                filename: upload.filename.clone(),
                content_type: upload.content_type.clone(),
                bytes: upload.bytes,
                uploaded_by,
            })
            .await?;

        attachments::ActiveModel {
            id: Set(attachment_id),
            invoice_id: Set(model.id),
            filename: Set(upload.filename),
            mime_type: Set(upload.content_type),
            file_size: Set(i64::try_from(stored.file_size).unwrap_or(i64::MAX)),
            storage_provider: Set(stored.storage_provider),
            storage_key: Set(stored.storage_key),
            uploaded_by: Set(uploaded_by),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await?;

        let mut active = model.into_active_model();
        active.attachment_id = Set(Some(attachment_id));
        Ok(active.update(txn).await?)
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Approves a pending invoice (admin only).
    pub async fn approve(&self, id: Uuid, actor: Actor) -> Result<Invoice, RepositoryError> {
        self.transition(id, actor, AuditAction::Approved, |model, actor, _figures| {
            WorkflowService::approve(
                model.status.clone().into(),
                actor.role,
                UserId::from_uuid(actor.user_id),
            )
        })
        .await
    }

    /// Rejects a pending invoice (admin only, reason required).
    pub async fn reject(
        &self,
        id: Uuid,
        reason: &str,
        actor: Actor,
    ) -> Result<Invoice, RepositoryError> {
        self.transition(id, actor, AuditAction::Rejected, |model, actor, _figures| {
            WorkflowService::reject(
                model.status.clone().into(),
                actor.role,
                reason,
                UserId::from_uuid(actor.user_id),
            )
        })
        .await
    }

    /// Places an invoice on hold (admin only, reason required).
    pub async fn hold(
        &self,
        id: Uuid,
        reason: &str,
        actor: Actor,
    ) -> Result<Invoice, RepositoryError> {
        self.transition(id, actor, AuditAction::Held, |model, actor, _figures| {
            WorkflowService::hold(
                model.status.clone().into(),
                actor.role,
                reason,
                UserId::from_uuid(actor.user_id),
            )
        })
        .await
    }

    /// Lifts a hold, returning to the balance-derived status (admin only).
    pub async fn release(&self, id: Uuid, actor: Actor) -> Result<Invoice, RepositoryError> {
        self.transition(id, actor, AuditAction::Released, |model, actor, figures| {
            WorkflowService::release(
                model.status.clone().into(),
                actor.role,
                figures,
                UserId::from_uuid(actor.user_id),
            )
        })
        .await
    }

    /// Soft-deletes an invoice, starting the recovery window.
    pub async fn soft_delete(
        &self,
        id: Uuid,
        reason: Option<String>,
        retention_days: i64,
        actor: Actor,
    ) -> Result<Invoice, RepositoryError> {
        let txn = self.db.begin().await?;
        let model = find_for_update(&txn, id).await?;
        let before = serde_json::to_value(&model).ok();

        let action = WorkflowService::soft_delete(
            &tombstone_of(&model),
            actor.role,
            actor.owns(&model),
            UserId::from_uuid(actor.user_id),
            reason,
            retention_days,
        )?;

        let model = apply_action(&txn, model, &action).await?;
        txn.commit().await?;

        self.audit()
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(model.id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::SoftDeleted,
                before,
                after: serde_json::to_value(&model).ok(),
            })
            .await;

        to_domain(&model)
    }

    /// Restores a soft-deleted invoice before its deadline.
    pub async fn restore(&self, id: Uuid, actor: Actor) -> Result<Invoice, RepositoryError> {
        let txn = self.db.begin().await?;
        let model = find_for_update(&txn, id).await?;
        let before = serde_json::to_value(&model).ok();

        let action = WorkflowService::restore(
            &tombstone_of(&model),
            actor.role,
            actor.owns(&model),
            UserId::from_uuid(actor.user_id),
        )?;

        let model = apply_action(&txn, model, &action).await?;
        txn.commit().await?;

        self.audit()
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(model.id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: AuditAction::Restored,
                before,
                after: serde_json::to_value(&model).ok(),
            })
            .await;

        to_domain(&model)
    }

    /// Shared transition plumbing: load-and-lock, global hidden guard, run
    /// the state machine, persist, audit.
    async fn transition<F>(
        &self,
        id: Uuid,
        actor: Actor,
        audit_action: AuditAction,
        decide: F,
    ) -> Result<Invoice, RepositoryError>
    where
        F: FnOnce(
            &invoices::Model,
            Actor,
            &InvoiceFigures,
        ) -> Result<WorkflowAction, remit_core::workflow::WorkflowError>,
    {
        let txn = self.db.begin().await?;
        let model = find_for_update(&txn, id).await?;
        WorkflowService::guard_visible(&tombstone_of(&model))?;

        let figures = figures_in_txn(&txn, &model).await?;
        let before = serde_json::to_value(&model).ok();

        let action = decide(&model, actor, &figures)?;
        let model = apply_action(&txn, model, &action).await?;
        txn.commit().await?;

        self.audit()
            .record_best_effort(AuditEvent {
                invoice_id: InvoiceId::from_uuid(model.id),
                actor_id: UserId::from_uuid(actor.user_id),
                action: audit_action,
                before,
                after: serde_json::to_value(&model).ok(),
            })
            .await;

        to_domain(&model)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Loads one invoice with its ledgers and derived figures.
    pub async fn get(&self, id: Uuid) -> Result<InvoiceWithFigures, RepositoryError> {
        let model = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;

        let payment_models = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(id))
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let credit_models = credit_notes::Entity::find()
            .filter(credit_notes::Column::InvoiceId.eq(id))
            .order_by_asc(credit_notes::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let invoice = to_domain(&model)?;
        let payments: Vec<Payment> = payment_models.iter().map(payment_to_domain).collect();
        let credit_notes: Vec<CreditNote> = credit_models.iter().map(credit_to_domain).collect();
        let figures = InvoiceFigures::derive(&invoice, &payments, &credit_notes);

        Ok(InvoiceWithFigures {
            invoice,
            payments,
            credit_notes,
            figures,
        })
    }

    /// Lists invoices with figures derived through the same single
    /// derivation point the detail view uses.
    pub async fn list(
        &self,
        filter: InvoiceFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<(Invoice, InvoiceFigures)>, u64), RepositoryError> {
        let mut query = invoices::Entity::find();

        if !filter.include_hidden {
            query = query.filter(invoices::Column::IsHidden.eq(false));
        }
        if let Some(status) = filter.status {
            let db_status: crate::entities::sea_orm_active_enums::InvoiceStatus = status.into();
            query = query.filter(invoices::Column::Status.eq(db_status));
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(invoices::Column::VendorId.eq(vendor_id));
        }

        let total = query.clone().count(&self.db).await?;

        let models = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let payment_models = payments::Entity::find()
            .filter(payments::Column::InvoiceId.is_in(ids.clone()))
            .all(&self.db)
            .await?;
        let credit_models = credit_notes::Entity::find()
            .filter(credit_notes::Column::InvoiceId.is_in(ids))
            .all(&self.db)
            .await?;

        let mut items = Vec::with_capacity(models.len());
        for model in &models {
            let invoice = to_domain(model)?;
            let invoice_payments: Vec<Payment> = payment_models
                .iter()
                .filter(|p| p.invoice_id == model.id)
                .map(payment_to_domain)
                .collect();
            let invoice_credits: Vec<CreditNote> = credit_models
                .iter()
                .filter(|c| c.invoice_id == model.id)
                .map(credit_to_domain)
                .collect();
            let figures = InvoiceFigures::derive(&invoice, &invoice_payments, &invoice_credits);
            items.push((invoice, figures));
        }

        Ok((items, total))
    }
}

// ============================================================================
// Validation pipelines
// ============================================================================

fn validate_create(input: &CreateInvoiceInput) -> Result<(), RepositoryError> {
    let mut validation = Validation::new()
        .check(non_blank("invoice_number", &input.invoice_number))
        .check(amount_positive("invoice_amount", input.invoice_amount))
        .check(max_two_decimals("invoice_amount", input.invoice_amount))
        .check(withholding_percentage(
            input.tds_applicable,
            input.tds_percentage,
        ))
        .check(due_on_or_after_invoice_date(
            input.invoice_date,
            input.due_date,
        ));

    validation = match &input.kind {
        CreateInvoiceKind::Standard { description, .. } => {
            validation.check(non_blank("description", description))
        }
        CreateInvoiceKind::Recurring {
            period_start,
            period_end,
            ..
        } => validation.check(period_ordered(*period_start, *period_end)),
    };

    Ok(validation.finish()?)
}

fn validate_update(input: &UpdateInvoiceInput) -> Result<(), RepositoryError> {
    let mut validation = Validation::new()
        .check(non_blank("invoice_number", &input.invoice_number))
        .check(amount_positive("invoice_amount", input.invoice_amount))
        .check(max_two_decimals("invoice_amount", input.invoice_amount))
        .check(withholding_percentage(
            input.tds_applicable,
            input.tds_percentage,
        ))
        .check(due_on_or_after_invoice_date(
            input.invoice_date,
            input.due_date,
        ));

    validation = match &input.details {
        UpdateInvoiceDetails::Standard { description, .. } => {
            validation.check(non_blank("description", description))
        }
        UpdateInvoiceDetails::Recurring {
            period_start,
            period_end,
        } => validation.check(period_ordered(*period_start, *period_end)),
    };

    Ok(validation.finish()?)
}

// ============================================================================
// Master-data resolution
// ============================================================================

/// Resolves the create input's kind against master data, returning the
/// effective vendor ID and the domain kind.
async fn resolve_kind(
    txn: &DatabaseTransaction,
    kind: &CreateInvoiceKind,
) -> Result<(Uuid, InvoiceKind), RepositoryError> {
    match kind {
        CreateInvoiceKind::Standard {
            vendor_id,
            entity_id,
            category_id,
            currency_id,
            description,
        } => {
            MasterDataRepository::ensure_vendor_active(txn, *vendor_id).await?;
            MasterDataRepository::ensure_entity_active(txn, *entity_id).await?;
            MasterDataRepository::ensure_category_active(txn, *category_id).await?;
            MasterDataRepository::ensure_currency_active(txn, *currency_id).await?;

            Ok((
                *vendor_id,
                InvoiceKind::Standard {
                    entity_id: EntityId::from_uuid(*entity_id),
                    category_id: CategoryId::from_uuid(*category_id),
                    currency_id: CurrencyId::from_uuid(*currency_id),
                    description: description.trim().to_string(),
                },
            ))
        }
        CreateInvoiceKind::Recurring {
            profile_id,
            period_start,
            period_end,
        } => {
            let profile = MasterDataRepository::ensure_profile_active(txn, *profile_id).await?;
            MasterDataRepository::ensure_vendor_active(txn, profile.vendor_id).await?;

            Ok((
                profile.vendor_id,
                InvoiceKind::Recurring {
                    profile_id: InvoiceProfileId::from_uuid(*profile_id),
                    period_start: *period_start,
                    period_end: *period_end,
                },
            ))
        }
    }
}

/// Resolves update details against the stored kind; a mismatch is a
/// validation failure, since the binding is fixed for the record's life.
async fn resolve_update_details(
    txn: &DatabaseTransaction,
    model: &invoices::Model,
    details: &UpdateInvoiceDetails,
) -> Result<InvoiceKind, RepositoryError> {
    match (model.is_recurring, details) {
        (
            false,
            UpdateInvoiceDetails::Standard {
                entity_id,
                category_id,
                currency_id,
                description,
            },
        ) => {
            MasterDataRepository::ensure_vendor_active(txn, model.vendor_id).await?;
            MasterDataRepository::ensure_entity_active(txn, *entity_id).await?;
            MasterDataRepository::ensure_category_active(txn, *category_id).await?;
            MasterDataRepository::ensure_currency_active(txn, *currency_id).await?;

            Ok(InvoiceKind::Standard {
                entity_id: EntityId::from_uuid(*entity_id),
                category_id: CategoryId::from_uuid(*category_id),
                currency_id: CurrencyId::from_uuid(*currency_id),
                description: description.trim().to_string(),
            })
        }
        (
            true,
            UpdateInvoiceDetails::Recurring {
                period_start,
                period_end,
            },
        ) => {
            let profile_id = model.profile_id.ok_or_else(|| {
                RepositoryError::Inconsistent(format!(
                    "recurring invoice {} has no profile",
                    model.id
                ))
            })?;
            let profile = MasterDataRepository::ensure_profile_active(txn, profile_id).await?;
            MasterDataRepository::ensure_vendor_active(txn, profile.vendor_id).await?;

            Ok(InvoiceKind::Recurring {
                profile_id: InvoiceProfileId::from_uuid(profile_id),
                period_start: *period_start,
                period_end: *period_end,
            })
        }
        _ => Err(RepositoryError::Validation(
            remit_core::validate::ValidationError(vec![FieldError::new(
                "is_recurring",
                "an invoice cannot switch between recurring and standalone",
            )]),
        )),
    }
}

// ============================================================================
// Duplicate scope
// ============================================================================

fn scope_description(kind: &InvoiceKind) -> &'static str {
    if kind.is_recurring() {
        "(invoice_number, vendor, profile)"
    } else {
        "(invoice_number, vendor, description)"
    }
}

/// Pre-checks the scoped uniqueness rule inside the write transaction.
///
/// The partial unique indexes remain the final arbiter; this check exists
/// to produce a precise error before any row is written.
async fn ensure_unique_scope(
    txn: &DatabaseTransaction,
    invoice_number: &str,
    vendor_id: Uuid,
    kind: &InvoiceKind,
    exclude: Option<Uuid>,
) -> Result<(), RepositoryError> {
    let mut query = invoices::Entity::find()
        .filter(invoices::Column::InvoiceNumber.eq(invoice_number.trim()))
        .filter(invoices::Column::VendorId.eq(vendor_id));

    query = match kind {
        InvoiceKind::Recurring { profile_id, .. } => query
            .filter(invoices::Column::IsRecurring.eq(true))
            .filter(invoices::Column::ProfileId.eq(profile_id.into_inner())),
        InvoiceKind::Standard { description, .. } => query
            .filter(invoices::Column::IsRecurring.eq(false))
            .filter(invoices::Column::Description.eq(description.clone())),
    };

    if let Some(id) = exclude {
        query = query.filter(invoices::Column::Id.ne(id));
    }

    if query.count(txn).await? > 0 {
        return Err(RepositoryError::DuplicateInvoiceNumber {
            scope: scope_description(kind).to_string(),
        });
    }
    Ok(())
}

/// Maps a unique-index violation raised by the insert itself (a racing
/// writer slipped past the pre-check) onto the same typed error.
fn map_unique_violation(e: sea_orm::DbErr, kind: &InvoiceKind) -> RepositoryError {
    if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
        RepositoryError::DuplicateInvoiceNumber {
            scope: scope_description(kind).to_string(),
        }
    } else {
        RepositoryError::Database(e)
    }
}

// ============================================================================
// Model <-> domain mapping
// ============================================================================

/// Loads an invoice row with a `FOR UPDATE` lock, serializing concurrent
/// writers on the same invoice.
pub(crate) async fn find_for_update(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<invoices::Model, RepositoryError> {
    invoices::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(RepositoryError::NotFound(id))
}

/// Reconstructs the soft-delete tombstone from the row's columns.
pub(crate) fn tombstone_of(model: &invoices::Model) -> Tombstone {
    if !model.is_hidden {
        return Tombstone::Active;
    }

    match (
        model.hidden_by,
        model.hidden_at,
        model.deleted_at,
        model.recovery_deadline,
    ) {
        (Some(hidden_by), Some(hidden_at), Some(deleted_at), Some(recovery_deadline)) => {
            Tombstone::Hidden {
                hidden_by: UserId::from_uuid(hidden_by),
                hidden_at: hidden_at.into(),
                reason: model.hidden_reason.clone(),
                deleted_at: deleted_at.into(),
                recovery_deadline: recovery_deadline.into(),
            }
        }
        // A half-set tombstone still hides the invoice; surface it with
        // the deletion clock pinned to the hidden timestamp.
        _ => {
            let at = model
                .hidden_at
                .map_or_else(|| model.updated_at.into(), Into::into);
            Tombstone::Hidden {
                hidden_by: UserId::from_uuid(model.hidden_by.unwrap_or(model.created_by)),
                hidden_at: at,
                reason: model.hidden_reason.clone(),
                deleted_at: at,
                recovery_deadline: model.recovery_deadline.map_or(at, Into::into),
            }
        }
    }
}

/// Maps a stored row to the domain invoice.
pub(crate) fn to_domain(model: &invoices::Model) -> Result<Invoice, RepositoryError> {
    let kind = if model.is_recurring {
        InvoiceKind::Recurring {
            profile_id: InvoiceProfileId::from_uuid(model.profile_id.ok_or_else(|| {
                RepositoryError::Inconsistent(format!(
                    "recurring invoice {} has no profile",
                    model.id
                ))
            })?),
            period_start: model.period_start.ok_or_else(|| {
                RepositoryError::Inconsistent(format!(
                    "recurring invoice {} has no period start",
                    model.id
                ))
            })?,
            period_end: model.period_end.ok_or_else(|| {
                RepositoryError::Inconsistent(format!(
                    "recurring invoice {} has no period end",
                    model.id
                ))
            })?,
        }
    } else {
        InvoiceKind::Standard {
            entity_id: EntityId::from_uuid(model.entity_id.ok_or_else(|| {
                RepositoryError::Inconsistent(format!("invoice {} has no entity", model.id))
            })?),
            category_id: CategoryId::from_uuid(model.category_id.ok_or_else(|| {
                RepositoryError::Inconsistent(format!("invoice {} has no category", model.id))
            })?),
            currency_id: CurrencyId::from_uuid(model.currency_id.ok_or_else(|| {
                RepositoryError::Inconsistent(format!("invoice {} has no currency", model.id))
            })?),
            description: model.description.clone().unwrap_or_default(),
        }
    };

    let rejection = match (&model.rejection_reason, model.rejected_by, model.rejected_at) {
        (Some(reason), Some(by), Some(at)) => Some(Rejection {
            reason: reason.clone(),
            rejected_by: UserId::from_uuid(by),
            rejected_at: at.into(),
        }),
        _ => None,
    };

    let hold = match (&model.hold_reason, model.hold_by, model.hold_at) {
        (Some(reason), Some(by), Some(at)) => Some(Hold {
            reason: reason.clone(),
            held_by: UserId::from_uuid(by),
            held_at: at.into(),
        }),
        _ => None,
    };

    Ok(Invoice {
        id: InvoiceId::from_uuid(model.id),
        invoice_number: model.invoice_number.clone(),
        vendor_id: VendorId::from_uuid(model.vendor_id),
        kind,
        invoice_date: model.invoice_date,
        due_date: model.due_date,
        amount: model.invoice_amount,
        withholding: WithholdingConfig {
            applicable: model.tds_applicable,
            percentage: model.tds_percentage,
            rounded: model.tds_rounded,
        },
        status: model.status.clone().into(),
        rejection,
        hold,
        tombstone: tombstone_of(model),
        attachment_id: model.attachment_id.map(AttachmentId::from_uuid),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

/// Maps a stored payment row to the domain payment.
pub(crate) fn payment_to_domain(model: &payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(model.id),
        invoice_id: InvoiceId::from_uuid(model.invoice_id),
        amount_paid: model.amount_paid,
        payment_date: model.payment_date,
        payment_type_id: PaymentTypeId::from_uuid(model.payment_type_id),
        payment_reference: model.payment_reference.clone(),
        tds_amount_applied: model.tds_amount_applied,
        tds_rounded: model.tds_rounded,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
    }
}

/// Maps a stored credit note row to the domain credit note.
pub(crate) fn credit_to_domain(model: &credit_notes::Model) -> CreditNote {
    CreditNote {
        id: CreditNoteId::from_uuid(model.id),
        invoice_id: InvoiceId::from_uuid(model.invoice_id),
        amount: model.amount,
        reason: model.reason.clone(),
        tds_applicable: model.tds_applicable,
        tds_amount: model.tds_amount,
        credit_note_date: model.credit_note_date,
        attachment_id: model.attachment_id.map(AttachmentId::from_uuid),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
    }
}

/// Derives figures for a row inside a transaction.
pub(crate) async fn figures_in_txn(
    txn: &DatabaseTransaction,
    model: &invoices::Model,
) -> Result<InvoiceFigures, RepositoryError> {
    let payment_models = payments::Entity::find()
        .filter(payments::Column::InvoiceId.eq(model.id))
        .all(txn)
        .await?;
    let credit_models = credit_notes::Entity::find()
        .filter(credit_notes::Column::InvoiceId.eq(model.id))
        .all(txn)
        .await?;

    let invoice = to_domain(model)?;
    let payments: Vec<Payment> = payment_models.iter().map(payment_to_domain).collect();
    let credits: Vec<CreditNote> = credit_models.iter().map(credit_to_domain).collect();
    Ok(InvoiceFigures::derive(&invoice, &payments, &credits))
}

/// Builds the insertable row from a domain invoice.
fn to_active_model(invoice: &Invoice) -> invoices::ActiveModel {
    let (profile_id, entity_id, category_id, currency_id, description, period_start, period_end) =
        match &invoice.kind {
            InvoiceKind::Recurring {
                profile_id,
                period_start,
                period_end,
            } => (
                Some(profile_id.into_inner()),
                None,
                None,
                None,
                None,
                Some(*period_start),
                Some(*period_end),
            ),
            InvoiceKind::Standard {
                entity_id,
                category_id,
                currency_id,
                description,
            } => (
                None,
                Some(entity_id.into_inner()),
                Some(category_id.into_inner()),
                Some(currency_id.into_inner()),
                Some(description.clone()),
                None,
                None,
            ),
        };

    invoices::ActiveModel {
        id: Set(invoice.id.into_inner()),
        invoice_number: Set(invoice.invoice_number.clone()),
        is_recurring: Set(invoice.kind.is_recurring()),
        vendor_id: Set(invoice.vendor_id.into_inner()),
        profile_id: Set(profile_id),
        entity_id: Set(entity_id),
        category_id: Set(category_id),
        currency_id: Set(currency_id),
        description: Set(description),
        period_start: Set(period_start),
        period_end: Set(period_end),
        invoice_date: Set(invoice.invoice_date),
        due_date: Set(invoice.due_date),
        invoice_amount: Set(invoice.amount),
        tds_applicable: Set(invoice.withholding.applicable),
        tds_percentage: Set(invoice.withholding.percentage),
        tds_rounded: Set(invoice.withholding.rounded),
        status: Set(invoice.status.into()),
        rejection_reason: Set(None),
        rejected_by: Set(None),
        rejected_at: Set(None),
        hold_reason: Set(None),
        hold_by: Set(None),
        hold_at: Set(None),
        is_hidden: Set(false),
        hidden_by: Set(None),
        hidden_at: Set(None),
        hidden_reason: Set(None),
        deleted_at: Set(None),
        recovery_deadline: Set(None),
        attachment_id: Set(None),
        created_by: Set(invoice.created_by.into_inner()),
        created_at: Set(invoice.created_at.into()),
        updated_at: Set(invoice.updated_at.into()),
    }
}

/// Applies a workflow action's effects to the row.
pub(crate) async fn apply_action(
    txn: &DatabaseTransaction,
    model: invoices::Model,
    action: &WorkflowAction,
) -> Result<invoices::Model, RepositoryError> {
    let mut active = model.into_active_model();

    match action {
        WorkflowAction::Approve { new_status, .. } => {
            active.status = Set((*new_status).into());
        }
        WorkflowAction::Reject {
            new_status,
            rejection,
        } => {
            active.status = Set((*new_status).into());
            active.rejection_reason = Set(Some(rejection.reason.clone()));
            active.rejected_by = Set(Some(rejection.rejected_by.into_inner()));
            active.rejected_at = Set(Some(rejection.rejected_at.into()));
        }
        WorkflowAction::Hold { new_status, hold } => {
            active.status = Set((*new_status).into());
            active.hold_reason = Set(Some(hold.reason.clone()));
            active.hold_by = Set(Some(hold.held_by.into_inner()));
            active.hold_at = Set(Some(hold.held_at.into()));
        }
        WorkflowAction::Release { new_status, .. } => {
            active.status = Set((*new_status).into());
            active.hold_reason = Set(None);
            active.hold_by = Set(None);
            active.hold_at = Set(None);
        }
        WorkflowAction::SoftDelete { tombstone } => {
            if let Tombstone::Hidden {
                hidden_by,
                hidden_at,
                reason,
                deleted_at,
                recovery_deadline,
            } = tombstone
            {
                active.is_hidden = Set(true);
                active.hidden_by = Set(Some(hidden_by.into_inner()));
                active.hidden_at = Set(Some((*hidden_at).into()));
                active.hidden_reason = Set(reason.clone());
                active.deleted_at = Set(Some((*deleted_at).into()));
                active.recovery_deadline = Set(Some((*recovery_deadline).into()));
            }
        }
        WorkflowAction::Restore { .. } => {
            active.is_hidden = Set(false);
            active.hidden_by = Set(None);
            active.hidden_at = Set(None);
            active.hidden_reason = Set(None);
            active.deleted_at = Set(None);
            active.recovery_deadline = Set(None);
        }
    }

    active.updated_at = Set(Utc::now().into());
    Ok(active.update(txn).await?)
}
