//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth::auth_middleware};
use remit_db::repositories::RepositoryError;

pub mod credit_notes;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod purge;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(credit_notes::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The purge trigger authenticates with a shared secret, not a session
    Router::new()
        .merge(health::routes())
        .merge(purge::routes())
        .merge(protected_routes)
}

/// Maps a repository error onto the API error envelope.
///
/// Storage and database causes are logged but reach the caller as a
/// generic message; invoice mutations are never retried automatically, so
/// nothing is silently duplicated.
pub(crate) fn error_response(e: &RepositoryError) -> Response {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if status.is_server_error() {
        error!(error = %e, "internal error");
        "An error occurred".to_string()
    } else {
        e.to_string()
    };

    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = error_response(&RepositoryError::NotFound(Uuid::nil()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let response = error_response(&RepositoryError::Inconsistent("details".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
