//! Tag repository.

use quill_shared::dto::{CreateTagRequest, TagResponse, UpdateTagRequest};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryOrder, QuerySelect, Set,
};

use super::now;
use crate::entities::tags;

/// Tag repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tag.
    pub async fn create(&self, req: CreateTagRequest) -> Result<tags::Model, DbErr> {
        let now = now();
        tags::ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
    }

    /// Finds a tag by ID.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<tags::Model>, DbErr> {
        tags::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists tags alphabetically, with the total count.
    pub async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<tags::Model>, u64), DbErr> {
        let total = tags::Entity::find().count(&self.db).await?;
        let items = tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .order_by_asc(tags::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((items, total))
    }

    /// Updates the given fields. Returns `None` if the tag does not exist.
    pub async fn update(&self, id: i32, req: UpdateTagRequest) -> Result<Option<tags::Model>, DbErr> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut tag = current.into_active_model();
        if let Some(name) = req.name {
            tag.name = Set(name);
        }
        if let Some(description) = req.description {
            tag.description = Set(Some(description));
        }
        tag.updated_at = Set(now());

        tag.update(&self.db).await.map(Some)
    }

    /// Deletes a tag, detaching it from every post.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = tags::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<tags::Model> for TagResponse {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}
