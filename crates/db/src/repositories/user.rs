//! User repository for database operations.
//!
//! Implements [`UserStore`] so the user service can stay database-agnostic.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use quill_core::users::{CreateUserInput, User, UserChanges, UserError, UserStore};

use super::now;
use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn apply(&self, id: i32, changes: UserChanges) -> Result<Option<User>, UserError> {
        let txn = self.db.begin().await.map_err(repository_error)?;

        let Some(current) = users::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(repository_error)?
        else {
            return Ok(None);
        };

        let mut user = current.into_active_model();
        if let Some(name) = changes.name {
            user.name = Set(name);
        }
        if let Some(email) = changes.email {
            user.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            user.phone = Set(Some(phone));
        }
        if let Some(image_url) = changes.image_url {
            user.image_url = Set(Some(image_url));
        }
        if let Some(password_hash) = changes.password_hash {
            user.hashed_password = Set(password_hash);
        }
        user.updated_at = Set(now());

        match user.update(&txn).await {
            Ok(updated) => {
                txn.commit().await.map_err(repository_error)?;
                Ok(Some(updated.into()))
            }
            Err(e) => {
                txn.rollback().await.map_err(repository_error)?;
                Err(map_write_error(&e))
            }
        }
    }
}

impl UserStore for UserRepository {
    async fn insert(&self, input: CreateUserInput) -> Result<User, UserError> {
        let now = now();
        let user = users::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            hashed_password: Set(input.password_hash),
            image_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let txn = self.db.begin().await.map_err(repository_error)?;
        match user.insert(&txn).await {
            Ok(created) => {
                txn.commit().await.map_err(repository_error)?;
                Ok(created.into())
            }
            Err(e) => {
                txn.rollback().await.map_err(repository_error)?;
                Err(map_write_error(&e))
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|user| user.map(Into::into))
            .map_err(repository_error)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<User>, u64), UserError> {
        let total = users::Entity::find()
            .count(&self.db)
            .await
            .map_err(repository_error)?;

        let users = users::Entity::find()
            .order_by_desc(users::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repository_error)?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, UserError> {
        self.apply(id, changes).await
    }

    async fn set_image_url(&self, id: i32, url: String) -> Result<Option<User>, UserError> {
        self.apply(
            id,
            UserChanges {
                image_url: Some(url),
                ..Default::default()
            },
        )
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, UserError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(repository_error)?;
        Ok(result.rows_affected > 0)
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            password_hash: model.hashed_password,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn repository_error(e: DbErr) -> UserError {
    UserError::repository(e.to_string())
}

/// Turn a unique violation into [`UserError::Duplicate`].
///
/// Backends name the column differently (`users.phone` on SQLite,
/// `users_phone_key` on PostgreSQL) but both mention it.
fn map_write_error(e: &DbErr) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            let field = if msg.contains("phone") { "phone" } else { "email" };
            debug!(field, "Rejected duplicate user");
            UserError::duplicate(field)
        }
        _ => UserError::repository(e.to_string()),
    }
}
