//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Read-only serving of stored media under the public URL prefix
//! - Request extractors
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use quill_core::storage::MediaStorage;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Storage service for uploaded media.
    pub storage: Arc<MediaStorage>,
    /// Body size limit on upload routes, in bytes.
    pub max_upload_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(state.storage.media_root());
    let prefix = state.storage.url_prefix();

    let router = Router::new().nest("/api/v1", routes::api_routes(state.max_upload_bytes));
    let router = if prefix == "/" {
        router.fallback_service(media)
    } else {
        router.nest_service(&prefix, media)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
