//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod categories;
pub mod comments;
pub mod health;
pub mod posts;
pub mod tags;
pub mod users;

/// Creates the API router with all routes.
///
/// Upload routes accept bodies up to `max_upload_bytes`; everything else
/// keeps axum's default limit.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes(max_upload_bytes))
        .merge(categories::routes(max_upload_bytes))
        .merge(tags::routes())
        .merge(posts::routes(max_upload_bytes))
        .merge(comments::routes())
}

