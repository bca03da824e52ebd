//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the invoice lifecycle
//! - Authentication middleware resolving `{user_id, role}` from JWTs
//! - Request/response types

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use remit_core::storage::StorageService;
use remit_shared::JwtService;

/// Purge trigger settings carried in the application state.
#[derive(Clone)]
pub struct PurgeSettings {
    /// Shared secret expected in the `X-Purge-Token` header.
    pub shared_secret: String,
    /// Batch size per sweep run.
    pub batch_size: u64,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for file attachments (optional).
    pub storage: Option<Arc<StorageService>>,
    /// Soft-delete retention window in days (already clamped).
    pub retention_days: i64,
    /// Purge trigger settings.
    pub purge: PurgeSettings,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
