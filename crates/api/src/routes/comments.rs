//! Comment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use quill_db::CommentRepository;
use quill_shared::dto::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use quill_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;

/// Creates the comment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/comments/{id}",
            patch(update_comment).delete(delete_comment),
        )
}

/// POST `/posts/{id}/comments` - Comment on a post.
async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = CommentRepository::new((*state.db).clone())
        .create(post_id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("post", post_id))?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// GET `/posts/{id}/comments` - Comments on a post, oldest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<CommentResponse>>, ApiError> {
    let (items, total) = CommentRepository::new((*state.db).clone())
        .list_for_post(post_id, page.offset(), page.limit())
        .await?
        .ok_or_else(|| ApiError::not_found("post", post_id))?;
    Ok(Json(
        PageResponse::new(items, page, total).map(CommentResponse::from),
    ))
}

async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    CommentRepository::new((*state.db).clone())
        .update(id, payload.message)
        .await?
        .map(|comment| Json(comment.into()))
        .ok_or_else(|| ApiError::not_found("comment", id))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if CommentRepository::new((*state.db).clone()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("comment", id))
    }
}
