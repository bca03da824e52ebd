//! Invoice lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use base64::Engine as _;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use remit_core::invoice::{InvoiceFigures, InvoiceKind};
use remit_core::payment::PaymentCandidate;
use remit_db::repositories::invoice::{
    AttachmentUpload, CreateInvoiceInput, CreateInvoiceKind, InvoiceFilter, InvoiceRepository,
    InvoiceWithFigures, UpdateInvoiceDetails, UpdateInvoiceInput,
};
use remit_db::repositories::AuditLogRepository;
use remit_shared::types::{PageRequest, PageResponse, PaymentTypeId};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/audit", get(list_audit_entries))
        .route("/invoices/{invoice_id}", patch(update_invoice))
        .route("/invoices/{invoice_id}", delete(soft_delete_invoice))
        .route("/invoices/{invoice_id}/approve", post(approve_invoice))
        .route("/invoices/{invoice_id}/reject", post(reject_invoice))
        .route("/invoices/{invoice_id}/hold", post(hold_invoice))
        .route("/invoices/{invoice_id}/release", post(release_invoice))
        .route("/invoices/{invoice_id}/restore", post(restore_invoice))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by vendor.
    pub vendor: Option<Uuid>,
    /// Include soft-deleted invoices.
    #[serde(default)]
    pub include_hidden: bool,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListInvoicesQuery {
    // query-string flattening of nested structs trips serde_urlencoded,
    // so the page fields stay flat and fold here
    fn page_request(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(default.page).max(1),
            per_page: self.per_page.unwrap_or(default.per_page).clamp(1, 100),
        }
    }
}

/// An uploaded file, base64-encoded in the JSON body.
#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Base64-encoded file bytes.
    pub data: String,
}

impl AttachmentRequest {
    fn decode(self) -> Result<AttachmentUpload, axum::response::Response> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_attachment",
                        "message": "Attachment data is not valid base64"
                    })),
                )
                    .into_response()
            })?;

        Ok(AttachmentUpload {
            filename: self.filename,
            content_type: self.content_type,
            bytes,
        })
    }
}

/// Initial payment recorded alongside a paid-at-creation invoice.
#[derive(Debug, Deserialize)]
pub struct InitialPaymentRequest {
    /// Amount paid.
    pub amount_paid: Decimal,
    /// Date of the payment.
    pub payment_date: NaiveDate,
    /// Payment type reference.
    pub payment_type_id: Uuid,
    /// Reference string, if the type requires one.
    pub payment_reference: Option<String>,
    /// Per-payment override of the rounding preference.
    pub tds_rounded: Option<bool>,
}

impl From<InitialPaymentRequest> for PaymentCandidate {
    fn from(req: InitialPaymentRequest) -> Self {
        Self {
            amount_paid: req.amount_paid,
            payment_date: req.payment_date,
            payment_type_id: PaymentTypeId::from_uuid(req.payment_type_id),
            payment_reference: req.payment_reference,
            tds_rounded: req.tds_rounded,
        }
    }
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Free-text invoice number.
    pub invoice_number: String,
    /// Recurring (profile-bound) or standalone.
    pub is_recurring: bool,
    /// Vendor (standalone only).
    pub vendor_id: Option<Uuid>,
    /// Billing entity (standalone only).
    pub entity_id: Option<Uuid>,
    /// Category (standalone only).
    pub category_id: Option<Uuid>,
    /// Currency (standalone only).
    pub currency_id: Option<Uuid>,
    /// Description (standalone only).
    pub description: Option<String>,
    /// Profile (recurring only).
    pub profile_id: Option<Uuid>,
    /// Billing period start (recurring only).
    pub period_start: Option<NaiveDate>,
    /// Billing period end (recurring only).
    pub period_end: Option<NaiveDate>,
    /// Date on the vendor's document.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Gross amount.
    pub invoice_amount: Decimal,
    /// Whether withholding applies.
    #[serde(default)]
    pub tds_applicable: bool,
    /// Withholding percentage.
    pub tds_percentage: Option<Decimal>,
    /// Ceiling rounding preference.
    #[serde(default)]
    pub tds_rounded: bool,
    /// Present when the invoice is created already paid.
    pub initial_payment: Option<InitialPaymentRequest>,
    /// Backing document.
    pub attachment: Option<AttachmentRequest>,
}

/// Request body for updating an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Free-text invoice number.
    pub invoice_number: String,
    /// Date on the vendor's document.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Gross amount.
    pub invoice_amount: Decimal,
    /// Whether withholding applies.
    #[serde(default)]
    pub tds_applicable: bool,
    /// Withholding percentage.
    pub tds_percentage: Option<Decimal>,
    /// Ceiling rounding preference.
    #[serde(default)]
    pub tds_rounded: bool,
    /// Billing entity (standalone only).
    pub entity_id: Option<Uuid>,
    /// Category (standalone only).
    pub category_id: Option<Uuid>,
    /// Currency (standalone only).
    pub currency_id: Option<Uuid>,
    /// Description (standalone only).
    pub description: Option<String>,
    /// Billing period start (recurring only).
    pub period_start: Option<NaiveDate>,
    /// Billing period end (recurring only).
    pub period_end: Option<NaiveDate>,
    /// Replacement backing document.
    pub attachment: Option<AttachmentRequest>,
}

/// Request body carrying a reason (reject, hold, soft delete).
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// The reason.
    pub reason: Option<String>,
}

/// Response for an invoice with derived figures.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Recurring flag.
    pub is_recurring: bool,
    /// Vendor ID.
    pub vendor_id: Uuid,
    /// Profile ID (recurring).
    pub profile_id: Option<Uuid>,
    /// Description (standalone).
    pub description: Option<String>,
    /// Invoice date.
    pub invoice_date: String,
    /// Due date.
    pub due_date: String,
    /// Gross amount.
    pub invoice_amount: String,
    /// Withholding applies.
    pub tds_applicable: bool,
    /// Withholding percentage.
    pub tds_percentage: Option<String>,
    /// Ceiling rounding preference.
    pub tds_rounded: bool,
    /// Status.
    pub status: String,
    /// Soft-delete flag.
    pub is_hidden: bool,
    /// Net payable.
    pub net_payable: String,
    /// Total paid.
    pub total_paid: String,
    /// Total credited.
    pub total_credited: String,
    /// Remaining balance.
    pub remaining_balance: String,
    /// Creator.
    pub created_by: Uuid,
    /// Created timestamp.
    pub created_at: String,
    /// Updated timestamp.
    pub updated_at: String,
}

impl InvoiceResponse {
    fn from_domain(invoice: &remit_core::invoice::Invoice, figures: &InvoiceFigures) -> Self {
        let (profile_id, description) = match &invoice.kind {
            InvoiceKind::Recurring { profile_id, .. } => (Some(profile_id.into_inner()), None),
            InvoiceKind::Standard { description, .. } => (None, Some(description.clone())),
        };

        Self {
            id: invoice.id.into_inner(),
            invoice_number: invoice.invoice_number.clone(),
            is_recurring: invoice.kind.is_recurring(),
            vendor_id: invoice.vendor_id.into_inner(),
            profile_id,
            description,
            invoice_date: invoice.invoice_date.to_string(),
            due_date: invoice.due_date.to_string(),
            invoice_amount: invoice.amount.to_string(),
            tds_applicable: invoice.withholding.applicable,
            tds_percentage: invoice.withholding.percentage.map(|p| p.to_string()),
            tds_rounded: invoice.withholding.rounded,
            status: invoice.status.as_str().to_string(),
            is_hidden: invoice.tombstone.is_hidden(),
            net_payable: figures.net_payable.to_string(),
            total_paid: figures.total_paid.to_string(),
            total_credited: figures.total_credited.to_string(),
            remaining_balance: figures.remaining_balance.to_string(),
            created_by: invoice.created_by.into_inner(),
            created_at: invoice.created_at.to_rfc3339(),
            updated_at: invoice.updated_at.to_rfc3339(),
        }
    }

    fn from_loaded(loaded: &InvoiceWithFigures) -> Self {
        Self::from_domain(&loaded.invoice, &loaded.figures)
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/invoices` - List invoices with derived figures.
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    if let Err(response) = auth.actor() {
        return response;
    }

    let filter = InvoiceFilter {
        status: query
            .status
            .as_deref()
            .and_then(remit_core::invoice::InvoiceStatus::parse),
        vendor_id: query.vendor,
        include_hidden: query.include_hidden,
    };

    let page = query.page_request();
    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.list(filter, page.offset(), page.limit()).await {
        Ok((items, total)) => {
            let invoices: Vec<InvoiceResponse> = items
                .iter()
                .map(|(invoice, figures)| InvoiceResponse::from_domain(invoice, figures))
                .collect();

            let body = PageResponse::new(invoices, page.page, page.per_page, total);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}/audit` - Audit trail, newest first.
async fn list_audit_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.actor() {
        return response;
    }

    let repo = AuditLogRepository::new((*state.db).clone());
    match repo.list_for_invoice(invoice_id).await {
        Ok(entries) => {
            let items: Vec<_> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "id": entry.id,
                        "actor_id": entry.actor_id,
                        "action": entry.action,
                        "before": entry.before_snapshot,
                        "after": entry.after_snapshot,
                        "created_at": entry.created_at.to_rfc3339()
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "entries": items }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices` - Create an invoice.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let kind = match build_create_kind(&payload) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let attachment = match payload.attachment.map(AttachmentRequest::decode).transpose() {
        Ok(attachment) => attachment,
        Err(response) => return response,
    };

    let input = CreateInvoiceInput {
        invoice_number: payload.invoice_number,
        kind,
        invoice_date: payload.invoice_date,
        due_date: payload.due_date,
        invoice_amount: payload.invoice_amount,
        tds_applicable: payload.tds_applicable,
        tds_percentage: payload.tds_percentage,
        tds_rounded: payload.tds_rounded,
        initial_payment: payload.initial_payment.map(Into::into),
        attachment,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.create(input, actor).await {
        Ok(created) => {
            info!(invoice_id = %created.invoice.id, status = %created.invoice.status, "invoice created");
            (StatusCode::CREATED, Json(InvoiceResponse::from_loaded(&created))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Invoice detail with ledgers.
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.actor() {
        return response;
    }

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.get(invoice_id).await {
        Ok(loaded) => (StatusCode::OK, Json(InvoiceResponse::from_loaded(&loaded))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PATCH `/invoices/{invoice_id}` - Update an invoice.
async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let details = match build_update_details(&payload) {
        Ok(details) => details,
        Err(response) => return response,
    };

    let attachment = match payload.attachment.map(AttachmentRequest::decode).transpose() {
        Ok(attachment) => attachment,
        Err(response) => return response,
    };

    let input = UpdateInvoiceInput {
        invoice_number: payload.invoice_number,
        invoice_date: payload.invoice_date,
        due_date: payload.due_date,
        invoice_amount: payload.invoice_amount,
        tds_applicable: payload.tds_applicable,
        tds_percentage: payload.tds_percentage,
        tds_rounded: payload.tds_rounded,
        details,
        attachment,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.update(invoice_id, input, actor).await {
        Ok(updated) => {
            info!(invoice_id = %invoice_id, status = %updated.invoice.status, "invoice updated");
            (StatusCode::OK, Json(InvoiceResponse::from_loaded(&updated))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/approve` - Approve a pending invoice.
async fn approve_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.approve(invoice_id, actor).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, "invoice approved");
            (
                StatusCode::OK,
                Json(json!({ "id": invoice.id, "status": invoice.status.as_str() })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/reject` - Reject a pending invoice.
async fn reject_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let reason = payload.reason.unwrap_or_default();
    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.reject(invoice_id, &reason, actor).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, "invoice rejected");
            (
                StatusCode::OK,
                Json(json!({ "id": invoice.id, "status": invoice.status.as_str() })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/hold` - Suspend payments.
async fn hold_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<ReasonRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let reason = payload.reason.unwrap_or_default();
    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.hold(invoice_id, &reason, actor).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, "invoice held");
            (
                StatusCode::OK,
                Json(json!({ "id": invoice.id, "status": invoice.status.as_str() })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/release` - Lift a hold.
async fn release_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.release(invoice_id, actor).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, status = %invoice.status, "hold released");
            (
                StatusCode::OK,
                Json(json!({ "id": invoice.id, "status": invoice.status.as_str() })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/invoices/{invoice_id}` - Soft-delete (reversible).
async fn soft_delete_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    payload: Option<Json<ReasonRequest>>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let reason = payload.and_then(|Json(p)| p.reason);
    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo
        .soft_delete(invoice_id, reason, state.retention_days, actor)
        .await
    {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, "invoice soft-deleted");
            match &invoice.tombstone {
                remit_core::invoice::Tombstone::Hidden {
                    recovery_deadline, ..
                } => (
                    StatusCode::OK,
                    Json(json!({
                        "id": invoice.id,
                        "is_hidden": true,
                        "recovery_deadline": recovery_deadline.to_rfc3339()
                    })),
                )
                    .into_response(),
                remit_core::invoice::Tombstone::Active => {
                    (StatusCode::OK, Json(json!({ "id": invoice.id }))).into_response()
                }
            }
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/restore` - Undo a soft delete.
async fn restore_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone(), state.storage.clone());
    match repo.restore(invoice_id, actor).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice_id, "invoice restored");
            (
                StatusCode::OK,
                Json(json!({ "id": invoice.id, "is_hidden": false })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn build_create_kind(
    payload: &CreateInvoiceRequest,
) -> Result<CreateInvoiceKind, axum::response::Response> {
    if payload.is_recurring {
        match (payload.profile_id, payload.period_start, payload.period_end) {
            (Some(profile_id), Some(period_start), Some(period_end)) => {
                Ok(CreateInvoiceKind::Recurring {
                    profile_id,
                    period_start,
                    period_end,
                })
            }
            _ => Err(bad_request(
                "missing_fields",
                "Recurring invoices require profile_id, period_start, and period_end",
            )),
        }
    } else {
        match (
            payload.vendor_id,
            payload.entity_id,
            payload.category_id,
            payload.currency_id,
            payload.description.clone(),
        ) {
            (
                Some(vendor_id),
                Some(entity_id),
                Some(category_id),
                Some(currency_id),
                Some(description),
            ) => Ok(CreateInvoiceKind::Standard {
                vendor_id,
                entity_id,
                category_id,
                currency_id,
                description,
            }),
            _ => Err(bad_request(
                "missing_fields",
                "Standalone invoices require vendor_id, entity_id, category_id, currency_id, and description",
            )),
        }
    }
}

fn build_update_details(
    payload: &UpdateInvoiceRequest,
) -> Result<UpdateInvoiceDetails, axum::response::Response> {
    match (payload.period_start, payload.period_end) {
        (Some(period_start), Some(period_end)) => Ok(UpdateInvoiceDetails::Recurring {
            period_start,
            period_end,
        }),
        (None, None) => match (
            payload.entity_id,
            payload.category_id,
            payload.currency_id,
            payload.description.clone(),
        ) {
            (Some(entity_id), Some(category_id), Some(currency_id), Some(description)) => {
                Ok(UpdateInvoiceDetails::Standard {
                    entity_id,
                    category_id,
                    currency_id,
                    description,
                })
            }
            _ => Err(bad_request(
                "missing_fields",
                "Updates require either period fields or the standalone detail fields",
            )),
        },
        _ => Err(bad_request(
            "missing_fields",
            "period_start and period_end must be supplied together",
        )),
    }
}

fn bad_request(error: &str, message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}
