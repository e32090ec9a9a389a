//! HTTP error responses.
//!
//! Every failure leaving a handler becomes an [`ApiError`], which renders as
//! `{"error": <code>, "message": <text>}` with the status of the wrapped
//! [`AppError`]. Server-side failures are logged and their details withheld.

use axum::{
    Json,
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill_core::storage::StorageError;
use quill_core::users::UserError;
use quill_db::{CommentError, PostError};
use quill_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// 404 for a missing resource.
    #[must_use]
    pub fn not_found(resource: &str, id: i32) -> Self {
        Self(AppError::NotFound(format!("{resource} {id} not found")))
    }

    /// 400 with a message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        Self(AppError::Database(e.to_string()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        upload_rejected(&e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        // Upload streams surface multipart failures as I/O errors.
        if let StorageError::Io { source, .. } = &e {
            if let Some(multipart) = source
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
            {
                return upload_rejected(multipart);
            }
        }
        Self(AppError::Storage(e.to_string()))
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::Duplicate { .. } => Self(AppError::Conflict(e.to_string())),
            UserError::Storage(storage) => storage.into(),
            UserError::Password(_) => Self(AppError::Internal(e.to_string())),
            UserError::Repository(msg) => Self(AppError::Database(msg)),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(e: PostError) -> Self {
        match e {
            PostError::InvalidReference(msg) => Self(AppError::InvalidReference(msg)),
            PostError::Database(db) => db.into(),
        }
    }
}

impl From<CommentError> for ApiError {
    fn from(e: CommentError) -> Self {
        match e {
            CommentError::InvalidReference(msg) => Self(AppError::InvalidReference(msg)),
            CommentError::Database(db) => db.into(),
        }
    }
}

fn upload_rejected(e: &MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(e.body_text()))
    } else {
        ApiError::bad_request(e.body_text())
    }
}
