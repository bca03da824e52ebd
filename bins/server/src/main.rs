//! Remit API Server
//!
//! Main entry point for the Remit accounts-payable backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remit_api::{AppState, PurgeSettings, create_router};
use remit_core::storage::{StorageConfig, StorageProvider, StorageService};
use remit_db::connect;
use remit_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create storage service (local filesystem unless overridden)
    let storage_root =
        std::env::var("REMIT__STORAGE__ROOT").unwrap_or_else(|_| "./data/attachments".into());
    let storage = StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(
        storage_root,
    )))
    .map(Arc::new)
    .ok();

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage,
        retention_days: config.retention.effective_days(),
        purge: PurgeSettings {
            shared_secret: config.purge.shared_secret.clone(),
            batch_size: config.purge.batch_size,
        },
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
