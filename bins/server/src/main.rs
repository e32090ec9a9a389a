//! Quill API Server
//!
//! Main entry point for the Quill content service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quill_api::{AppState, create_router};
use quill_core::storage::{MediaStorage, StorageConfig};
use quill_db::connect;
use quill_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let storage = MediaStorage::new(StorageConfig::from(&config.media))
        .context("Invalid media storage configuration")?;
    info!(
        root = %storage.media_root().display(),
        url_prefix = %storage.url_prefix(),
        max_upload_bytes = config.media.max_upload_bytes,
        "Media storage configured"
    );

    let state = AppState {
        db: Arc::new(db),
        storage: Arc::new(storage),
        max_upload_bytes: config.media.max_upload_bytes,
    };

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
