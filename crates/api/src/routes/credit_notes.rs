//! Credit note routes.

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
use remit_core::credit::{CreditNote, CreditNoteCandidate};
use remit_db::repositories::CreditNoteRepository;
use remit_shared::types::AttachmentId;

/// Creates the credit note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/{invoice_id}/credit-notes", get(list_credit_notes))
        .route("/invoices/{invoice_id}/credit-notes", post(record_credit_note))
}

/// Request body for recording a credit note.
#[derive(Debug, Deserialize)]
pub struct RecordCreditNoteRequest {
    /// Reduction amount.
    pub amount: Decimal,
    /// Reason for the adjustment.
    pub reason: String,
    /// Opt into proportional withholding reversal.
    #[serde(default)]
    pub reverse_tds: bool,
    /// Date on the credit note document.
    pub credit_note_date: NaiveDate,
    /// Optional reference to an existing attachment.
    pub attachment_id: Option<Uuid>,
}

/// Response for a credit note.
#[derive(Debug, Serialize)]
pub struct CreditNoteResponse {
    /// Credit note ID.
    pub id: Uuid,
    /// Invoice ID.
    pub invoice_id: Uuid,
    /// Reduction amount.
    pub amount: String,
    /// Reason.
    pub reason: String,
    /// Whether withheld tax was reversed.
    pub tds_applicable: bool,
    /// Reversed withheld tax.
    pub tds_amount: String,
    /// Document date.
    pub credit_note_date: String,
    /// Recorded at.
    pub created_at: String,
}

impl From<&CreditNote> for CreditNoteResponse {
    fn from(credit_note: &CreditNote) -> Self {
        Self {
            id: credit_note.id.into_inner(),
            invoice_id: credit_note.invoice_id.into_inner(),
            amount: credit_note.amount.to_string(),
            reason: credit_note.reason.clone(),
            tds_applicable: credit_note.tds_applicable,
            tds_amount: credit_note.tds_amount.to_string(),
            credit_note_date: credit_note.credit_note_date.to_string(),
            created_at: credit_note.created_at.to_rfc3339(),
        }
    }
}

/// GET `/invoices/{invoice_id}/credit-notes` - List credit notes.
async fn list_credit_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = auth.actor() {
        return response;
    }

    let repo = CreditNoteRepository::new((*state.db).clone());
    match repo.list(invoice_id).await {
        Ok(credit_notes) => {
            let items: Vec<CreditNoteResponse> = credit_notes.iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "credit_notes": items }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/credit-notes` - Record a credit note.
///
/// An amount exceeding the remaining balance is accepted; the response
/// then carries a warning instead of an error.
async fn record_credit_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<RecordCreditNoteRequest>,
) -> impl IntoResponse {
    let actor = match auth.actor() {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let candidate = CreditNoteCandidate {
        amount: payload.amount,
        reason: payload.reason,
        reverse_tds: payload.reverse_tds,
        credit_note_date: payload.credit_note_date,
        attachment_id: payload.attachment_id.map(AttachmentId::from_uuid),
    };

    let repo = CreditNoteRepository::new((*state.db).clone());
    match repo.record(invoice_id, candidate, actor).await {
        Ok(recorded) => {
            info!(
                invoice_id = %invoice_id,
                credit_note_id = %recorded.credit_note.id,
                exceeds_balance = recorded.exceeds_balance,
                "credit note recorded"
            );

            let warning = recorded
                .exceeds_balance
                .then_some("credited amount exceeds the remaining balance");

            (
                StatusCode::CREATED,
                Json(json!({
                    "credit_note": CreditNoteResponse::from(&recorded.credit_note),
                    "status": recorded.status.as_str(),
                    "remaining_balance": recorded.figures.remaining_balance.to_string(),
                    "warning": warning
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
