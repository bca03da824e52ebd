//! Scheduled purge trigger.
//!
//! Called by an external scheduler, not a user session; authenticates
//! with a shared secret in the `X-Purge-Token` header.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tracing::info;

use crate::routes::error_response;
use crate::AppState;
use remit_db::repositories::PurgeRepository;

/// Header carrying the shared purge secret.
pub const PURGE_TOKEN_HEADER: &str = "x-purge-token";

/// Creates the purge routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/purge/run", post(run_purge))
}

/// POST `/purge/run` - Run one bounded purge sweep.
async fn run_purge(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let presented = headers
        .get(PURGE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented != Some(state.purge.shared_secret.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_purge_token",
                "message": "Missing or invalid purge token"
            })),
        )
            .into_response();
    }

    let repo = PurgeRepository::new((*state.db).clone(), state.storage.clone());
    match repo.sweep(state.purge.batch_size).await {
        Ok(outcome) => {
            info!(
                purged = outcome.purged,
                failed = outcome.failed.len(),
                remaining = outcome.remaining,
                "purge sweep triggered"
            );

            let failed: Vec<_> = outcome
                .failed
                .iter()
                .map(|f| json!({ "invoice_id": f.invoice_id, "error": f.error }))
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "purged": outcome.purged,
                    "failed": failed,
                    "remaining": outcome.remaining
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
