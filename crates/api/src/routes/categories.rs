//! Category routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use quill_db::CategoryRepository;
use quill_shared::dto::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use quill_shared::types::{PageRequest, PageResponse};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, store_upload};

/// Subdirectory category images are stored under.
const CATEGORY_MEDIA_SUBDIR: &str = "categories";

/// Creates the category routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category).get(list_categories))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route(
            "/categories/{id}/image",
            post(upload_category_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// POST `/categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = CategoryRepository::new((*state.db).clone())
        .create(payload)
        .await?;
    info!(category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET `/categories` - List categories, newest first.
async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<CategoryResponse>>, ApiError> {
    let (items, total) = CategoryRepository::new((*state.db).clone())
        .list(page.offset(), page.limit())
        .await?;
    Ok(Json(
        PageResponse::new(items, page, total).map(CategoryResponse::from),
    ))
}

/// GET `/categories/{id}` - Get a category.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, ApiError> {
    CategoryRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .map(|category| Json(category.into()))
        .ok_or_else(|| ApiError::not_found("category", id))
}

/// PATCH `/categories/{id}` - Update a category.
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    CategoryRepository::new((*state.db).clone())
        .update(id, payload)
        .await?
        .map(|category| Json(category.into()))
        .ok_or_else(|| ApiError::not_found("category", id))
}

/// DELETE `/categories/{id}` - Delete a category and its posts.
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if CategoryRepository::new((*state.db).clone()).delete(id).await? {
        info!(category_id = id, "Category deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("category", id))
    }
}

/// POST `/categories/{id}/image` - Upload a cover image (multipart field `file`).
async fn upload_category_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<CategoryResponse>, ApiError> {
    let repo = CategoryRepository::new((*state.db).clone());
    if repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("category", id));
    }

    let asset = store_upload(&state.storage, &mut multipart, CATEGORY_MEDIA_SUBDIR).await?;
    info!(category_id = id, url = %asset.url, size = asset.size, "Category image stored");

    repo.set_image_url(id, asset.url)
        .await?
        .map(|category| Json(category.into()))
        .ok_or_else(|| ApiError::not_found("category", id))
}
