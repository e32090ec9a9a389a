//! Request extractors.

use std::io;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, multipart::Field},
};
use futures::TryStreamExt;
use quill_core::storage::{MediaStorage, StoredAsset};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use validator::Validate;

use crate::error::ApiError;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON and rule violations are both rejected with 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Whether `field` is the file part of an upload form.
pub fn is_file_field(field: &Field<'_>) -> bool {
    field.name() == Some(FILE_FIELD)
}

/// Adapt a multipart field into a byte reader without buffering it.
pub fn field_reader<'a>(field: Field<'a>) -> impl AsyncRead + Unpin + Send + 'a {
    StreamReader::new(Box::pin(field.map_err(io::Error::other)))
}

/// Rejection for an upload form without a `file` part.
pub fn missing_file_field() -> ApiError {
    ApiError::bad_request(format!("multipart field \"{FILE_FIELD}\" is required"))
}

/// Stream the first `file` part of `multipart` into `subdir`.
///
/// Other parts are skipped.
pub async fn store_upload(
    storage: &MediaStorage,
    multipart: &mut Multipart,
    subdir: &str,
) -> Result<StoredAsset, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if !is_file_field(&field) {
            continue;
        }
        let original_name = field.file_name().map(str::to_owned);
        let asset = storage
            .save(field_reader(field), original_name.as_deref(), Some(subdir))
            .await?;
        return Ok(asset);
    }
    Err(missing_file_field())
}
