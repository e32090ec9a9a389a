//! Post routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use quill_db::{PostFilter, PostRepository};
use quill_shared::dto::{CreatePostRequest, PostListQuery, PostResponse, UpdatePostRequest};
use quill_shared::types::PageResponse;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, store_upload};

/// Subdirectory post cover images are stored under.
const POST_MEDIA_SUBDIR: &str = "posts";

/// Creates the post routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post).get(list_posts))
        .route(
            "/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route(
            "/posts/{id}/image",
            post(upload_post_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// POST `/posts` - Create a post with its tags.
async fn create_post(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = PostRepository::new((*state.db).clone())
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET `/posts` - List posts, optionally by category or author.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PageResponse<PostResponse>>, ApiError> {
    let page = query.page_request();
    let filter = PostFilter {
        category_id: query.category_id,
        author_id: query.author_id,
    };

    let (items, total) = PostRepository::new((*state.db).clone())
        .list(filter, page.offset(), page.limit())
        .await?;
    Ok(Json(PageResponse::new(items, page, total).map(PostResponse::from)))
}

/// GET `/posts/{id}` - Get a post.
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PostResponse>, ApiError> {
    PostRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .map(|post| Json(post.into()))
        .ok_or_else(|| ApiError::not_found("post", id))
}

/// PATCH `/posts/{id}` - Update a post. `tag_ids` replaces the tag set.
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    PostRepository::new((*state.db).clone())
        .update(id, payload)
        .await?
        .map(|post| Json(post.into()))
        .ok_or_else(|| ApiError::not_found("post", id))
}

/// DELETE `/posts/{id}` - Delete a post with its comments.
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if PostRepository::new((*state.db).clone()).delete(id).await? {
        info!(post_id = id, "Post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("post", id))
    }
}

/// POST `/posts/{id}/image` - Upload a cover image (multipart field `file`).
async fn upload_post_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<PostResponse>, ApiError> {
    let repo = PostRepository::new((*state.db).clone());
    if repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("post", id));
    }

    let asset = store_upload(&state.storage, &mut multipart, POST_MEDIA_SUBDIR).await?;
    info!(post_id = id, url = %asset.url, size = asset.size, "Post image stored");

    repo.set_image_url(id, asset.url)
        .await?
        .map(|post| Json(post.into()))
        .ok_or_else(|| ApiError::not_found("post", id))
}
