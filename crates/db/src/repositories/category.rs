//! Category repository.

use quill_shared::dto::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{missing_as_none, now};
use crate::entities::categories;

/// Category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, req: CreateCategoryRequest) -> Result<categories::Model, DbErr> {
        let now = now();
        categories::ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            image_url: Set(req.image_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Finds a category by ID.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<categories::Model>, DbErr> {
        categories::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists categories, newest first, with the total count.
    pub async fn list(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<categories::Model>, u64), DbErr> {
        let total = categories::Entity::find().count(&self.db).await?;
        let items = categories::Entity::find()
            .order_by_desc(categories::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((items, total))
    }

    /// Updates the given fields. Returns `None` if the category does not
    /// exist, including when it is deleted before the write lands.
    pub async fn update(
        &self,
        id: i32,
        req: UpdateCategoryRequest,
    ) -> Result<Option<categories::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(current) = categories::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let updated = apply_changes(&txn, current, req).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Points the category at a newly stored image.
    pub async fn set_image_url(
        &self,
        id: i32,
        url: String,
    ) -> Result<Option<categories::Model>, DbErr> {
        self.update(
            id,
            UpdateCategoryRequest {
                image_url: Some(url),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes a category and, through the foreign keys, its posts.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = categories::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

async fn apply_changes<C: ConnectionTrait>(
    conn: &C,
    current: categories::Model,
    req: UpdateCategoryRequest,
) -> Result<Option<categories::Model>, DbErr> {
    let mut category = current.into_active_model();
    if let Some(name) = req.name {
        category.name = Set(name);
    }
    if let Some(description) = req.description {
        category.description = Set(Some(description));
    }
    if let Some(image_url) = req.image_url {
        category.image_url = Set(Some(image_url));
    }
    category.updated_at = Set(now());

    missing_as_none(category.update(conn).await)
}

impl From<categories::Model> for CategoryResponse {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
