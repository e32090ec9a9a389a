//! User account routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use quill_core::users::UserService;
use quill_db::UserRepository;
use quill_shared::dto::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use quill_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, field_reader, is_file_field, missing_file_field};

/// Creates the user routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route(
            "/users/{id}/image",
            post(upload_user_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

fn user_service(state: &AppState) -> UserService<UserRepository> {
    UserService::new(
        Arc::new(UserRepository::new((*state.db).clone())),
        state.storage.clone(),
    )
}

/// POST `/users` - Register a user.
async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_service(&state).register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET `/users` - List users, newest first.
async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    let users = user_service(&state).list(page).await?;
    Ok(Json(users.map(UserResponse::from)))
}

/// GET `/users/{id}` - Get a user.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    user_service(&state)
        .get(id)
        .await?
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::not_found("user", id))
}

/// PATCH `/users/{id}` - Update a user.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::bad_request("no fields to update"));
    }

    user_service(&state)
        .update(id, payload.into())
        .await?
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::not_found("user", id))
}

/// DELETE `/users/{id}` - Delete a user with their posts and comments.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if user_service(&state).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("user", id))
    }
}

/// POST `/users/{id}/image` - Upload a profile image (multipart field `file`).
async fn upload_user_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let service = user_service(&state);

    while let Some(field) = multipart.next_field().await? {
        if !is_file_field(&field) {
            continue;
        }
        let original_name = field.file_name().map(str::to_owned);

        let user = service
            .upload_image(id, field_reader(field), original_name.as_deref())
            .await?
            .ok_or_else(|| ApiError::not_found("user", id))?;
        return Ok(Json(user.into()));
    }

    Err(missing_file_field())
}
