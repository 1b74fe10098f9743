//! Campus CMS API Server
//!
//! Main entry point for the campus website backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use campus_api::{AppState, HttpLimits, create_router};
use campus_core::asset::{AssetManager, UploadPolicy};
use campus_core::resource::ResourceService;
use campus_core::storage::{StorageConfig, StorageService};
use campus_db::{ResourceRepository, connect};
use campus_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus=debug,tower_http=debug".into());
    let fmt_layer = if config.log.is_json() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    // Connect to database
    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Object storage
    let storage_config = StorageConfig::try_from(&config.storage)?;
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage configured"
    );

    let policy = UploadPolicy::from(&config.storage);
    let limits = HttpLimits::for_uploads(
        Duration::from_secs(config.server.request_timeout_secs),
        policy.max_file_size,
    );
    let assets = Arc::new(AssetManager::new(Arc::new(storage), policy));
    let resources = ResourceService::new(Arc::new(ResourceRepository::new(db)), assets);

    // Access gate
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        ..JwtConfig::default()
    });

    let state = AppState {
        resources: Arc::new(resources),
        jwt_service: Arc::new(jwt_service),
    };

    // Create router
    let app = create_router(state, limits);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
