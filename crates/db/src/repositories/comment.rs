//! Comment repository.

use quill_shared::dto::{CommentResponse, CreateCommentRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::now;
use crate::entities::{comments, posts, users};

/// Error types for comment operations.
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    /// Commenting user does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Comment repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    /// Creates a new comment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a comment to a post. Returns `None` if the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::InvalidReference` if the user does not exist.
    pub async fn create(
        &self,
        post_id: i32,
        req: CreateCommentRequest,
    ) -> Result<Option<comments::Model>, CommentError> {
        let txn = self.db.begin().await?;

        if posts::Entity::find_by_id(post_id).one(&txn).await?.is_none() {
            return Ok(None);
        }
        if users::Entity::find_by_id(req.user_id).one(&txn).await?.is_none() {
            return Err(CommentError::InvalidReference(format!(
                "user {} does not exist",
                req.user_id
            )));
        }

        let now = now();
        let comment = comments::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(req.user_id),
            message: Set(req.message),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(comment))
    }

    /// Finds a comment by ID.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<comments::Model>, DbErr> {
        comments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Comments on a post, oldest first. `None` if the post does not exist.
    pub async fn list_for_post(
        &self,
        post_id: i32,
        offset: u64,
        limit: u64,
    ) -> Result<Option<(Vec<comments::Model>, u64)>, DbErr> {
        if posts::Entity::find_by_id(post_id).one(&self.db).await?.is_none() {
            return Ok(None);
        }

        let query = comments::Entity::find().filter(comments::Column::PostId.eq(post_id));
        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_asc(comments::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(Some((items, total)))
    }

    /// Replaces the message text. Returns `None` if the comment does not exist.
    pub async fn update(&self, id: i32, message: String) -> Result<Option<comments::Model>, DbErr> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut comment = current.into_active_model();
        comment.message = Set(message);
        comment.updated_at = Set(now());
        comment.update(&self.db).await.map(Some)
    }

    /// Deletes a comment.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = comments::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<comments::Model> for CommentResponse {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            user_id: model.user_id,
            message: model.message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
