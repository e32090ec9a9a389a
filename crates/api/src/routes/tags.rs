//! Tag routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use quill_db::TagRepository;
use quill_shared::dto::{CreateTagRequest, TagResponse, UpdateTagRequest};
use quill_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;

/// Creates the tag routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags", post(create_tag).get(list_tags))
        .route(
            "/tags/{id}",
            get(get_tag).patch(update_tag).delete(delete_tag),
        )
}

async fn create_tag(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = TagRepository::new((*state.db).clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

async fn list_tags(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<TagResponse>>, ApiError> {
    let (items, total) = TagRepository::new((*state.db).clone())
        .list(page.offset(), page.limit())
        .await?;
    Ok(Json(PageResponse::new(items, page, total).map(TagResponse::from)))
}

async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, ApiError> {
    TagRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .map(|tag| Json(tag.into()))
        .ok_or_else(|| ApiError::not_found("tag", id))
}

async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateTagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    TagRepository::new((*state.db).clone())
        .update(id, payload)
        .await?
        .map(|tag| Json(tag.into()))
        .ok_or_else(|| ApiError::not_found("tag", id))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if TagRepository::new((*state.db).clone()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("tag", id))
    }
}
