//! User service implementation.

use std::future::Future;
use std::sync::Arc;

use quill_shared::types::{PageRequest, PageResponse};
use tokio::io::AsyncRead;
use tracing::{info, warn};

use super::error::UserError;
use super::types::{CreateUserInput, NewUser, User, UserChanges, UserUpdate};
use crate::auth::hash_password;
use crate::storage::MediaStorage;

/// Subdirectory profile images are stored under.
pub const USER_MEDIA_SUBDIR: &str = "users";

/// Persistence for user rows.
///
/// Implemented by the db crate. Uniqueness violations must surface as
/// [`UserError::Duplicate`] with any open transaction already rolled back.
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    fn insert(
        &self,
        input: CreateUserInput,
    ) -> impl Future<Output = Result<User, UserError>> + Send;

    /// Find a user by ID.
    fn find_by_id(&self, id: i32) -> impl Future<Output = Result<Option<User>, UserError>> + Send;

    /// One page of users, newest first, with the total row count.
    fn list(
        &self,
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<(Vec<User>, u64), UserError>> + Send;

    /// Apply `changes`; `None` if the user does not exist.
    fn update(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> impl Future<Output = Result<Option<User>, UserError>> + Send;

    /// Overwrite the image URL; `None` if the user does not exist.
    fn set_image_url(
        &self,
        id: i32,
        url: String,
    ) -> impl Future<Output = Result<Option<User>, UserError>> + Send;

    /// Delete a user; `false` if there was nothing to delete.
    fn delete(&self, id: i32) -> impl Future<Output = Result<bool, UserError>> + Send;
}

/// User CRUD plus profile image uploads.
pub struct UserService<S: UserStore> {
    store: Arc<S>,
    storage: Arc<MediaStorage>,
}

impl<S: UserStore> UserService<S> {
    /// Create a new user service.
    #[must_use]
    pub fn new(store: Arc<S>, storage: Arc<MediaStorage>) -> Self {
        Self { store, storage }
    }

    /// Hash the password and persist a new user.
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        let password_hash = hash_password(&new_user.password)?;

        let user = self
            .store
            .insert(CreateUserInput {
                name: new_user.name,
                email: new_user.email,
                phone: new_user.phone,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i32) -> Result<Option<User>, UserError> {
        self.store.find_by_id(id).await
    }

    /// List users, newest first.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<User>, UserError> {
        let (users, total) = self.store.list(page.offset(), page.limit()).await?;
        Ok(PageResponse::new(users, page, total))
    }

    /// Apply a partial update. A new password is re-hashed.
    pub async fn update(&self, id: i32, update: UserUpdate) -> Result<Option<User>, UserError> {
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;

        let changes = UserChanges {
            name: update.name,
            email: update.email,
            phone: update.phone,
            image_url: update.image_url,
            password_hash,
        };

        let user = self.store.update(id, changes).await?;
        if let Some(user) = &user {
            info!(user_id = user.id, "User updated");
        }
        Ok(user)
    }

    /// Delete a user. Their stored image, if any, stays on disk.
    pub async fn delete(&self, id: i32) -> Result<bool, UserError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(user_id = id, "User deleted");
        }
        Ok(deleted)
    }

    /// Store a new profile image and point the user at it.
    ///
    /// The user is looked up first; for an unknown ID nothing is written and
    /// `Ok(None)` is returned. The previous image is not removed.
    pub async fn upload_image<R>(
        &self,
        id: i32,
        source: R,
        original_name: Option<&str>,
    ) -> Result<Option<User>, UserError>
    where
        R: AsyncRead + Unpin + Send,
    {
        if self.store.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let asset = self
            .storage
            .save(source, original_name, Some(USER_MEDIA_SUBDIR))
            .await?;

        let user = self.store.set_image_url(id, asset.url.clone()).await?;
        match &user {
            Some(_) => info!(user_id = id, url = %asset.url, size = asset.size, "User image stored"),
            // Deleted while the upload was in flight.
            None => warn!(user_id = id, url = %asset.url, "User vanished during image upload"),
        }
        Ok(user)
    }
}
