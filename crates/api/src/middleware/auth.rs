//! Authentication middleware for protected routes.
//!
//! This is the boundary to the external identity provider: a valid JWT
//! resolves to `{user_id, role}`, anything else is `Unauthorized`.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use remit_core::workflow::ActorRole;
use remit_db::repositories::invoice::Actor;
use remit_shared::Claims;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (status, error, message) = match e {
                remit_shared::JwtError::Expired => {
                    (StatusCode::UNAUTHORIZED, "token_expired", "Token has expired")
                }
                _ => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_token",
                    "Invalid or malformed token",
                ),
            };

            (status, Json(json!({ "error": error, "message": message }))).into_response()
        }
    }
}

/// Extractor for the authenticated user's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the user's role string.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Resolves the repository-level actor, rejecting unknown roles.
    ///
    /// # Errors
    ///
    /// Returns a 401 response when the role claim is not one the state
    /// machine knows.
    pub fn actor(&self) -> Result<Actor, Response> {
        let Some(role) = ActorRole::parse(&self.0.role) else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unknown_role",
                    "message": format!("Unknown role claim: {}", self.0.role)
                })),
            )
                .into_response());
        };

        Ok(Actor {
            user_id: self.user_id(),
            role,
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthenticated",
                    "message": "Authentication required"
                })),
            ))
    }
}
