//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use remit_core::payment::{Payment, PaymentCandidate};
use remit_db::repositories::PaymentRepository;
use remit_shared::types::PaymentTypeId;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/{invoice_id}/payments", get(list_payments))
        .route("/invoices/{invoice_id}/payments", post(record_payment))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
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

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Invoice ID.
    pub invoice_id: Uuid,
    /// Amount paid.
    pub amount_paid: String,
    /// Payment date.
    pub payment_date: String,
    /// Payment type.
    pub payment_type_id: Uuid,
    /// Reference string.
    pub payment_reference: Option<String>,
    /// Withheld tax in effect at recording time.
    pub tds_amount_applied: String,
    /// Rounding mode snapshot.
    pub tds_rounded: bool,
    /// Recorded at.
    pub created_at: String,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.into_inner(),
            invoice_id: payment.invoice_id.into_inner(),
            amount_paid: payment.amount_paid.to_string(),
            payment_date: payment.payment_date.to_string(),
            payment_type_id: payment.payment_type_id.into_inner(),
            payment_reference: payment.payment_reference.clone(),
            tds_amount_applied: payment.tds_amount_applied.to_string(),
            tds_rounded: payment.tds_rounded,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// GET `/invoices/{invoice_id}/payments` - List payments.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.actor() {
        return response;
    }

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.list(invoice_id).await {
        Ok(payments) => {
            let items: Vec<PaymentResponse> = payments.iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "payments": items }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/payments` - Record a payment.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let candidate = PaymentCandidate {
        amount_paid: payload.amount_paid,
        payment_date: payload.payment_date,
        payment_type_id: PaymentTypeId::from_uuid(payload.payment_type_id),
        payment_reference: payload.payment_reference,
        tds_rounded: payload.tds_rounded,
    };

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.record(invoice_id, candidate, actor).await {
        Ok(recorded) => {
            info!(
                invoice_id = %invoice_id,
                payment_id = %recorded.payment.id,
                status = %recorded.status,
                "payment recorded"
            );

            (
                StatusCode::CREATED,
                Json(json!({
                    "payment": PaymentResponse::from(&recorded.payment),
                    "status": recorded.status.as_str(),
                    "remaining_balance": recorded.figures.remaining_balance.to_string()
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
