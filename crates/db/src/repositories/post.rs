//! Post repository.
//!
//! Posts own their tag links: creating or updating a post with `tag_ids`
//! writes the `post_tags` rows in the same transaction, and every read
//! returns the post together with its tags.

use std::collections::HashMap;

use quill_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};
use tracing::info;

use super::{missing_as_none, now};
use crate::entities::{categories, post_tags, posts, tags, users};

/// Error types for post operations.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// Author, category or tag does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A post and the tags attached to it, ordered by tag ID.
#[derive(Debug, Clone)]
pub struct PostWithTags {
    /// The post record.
    pub post: posts::Model,
    /// Attached tags.
    pub tags: Vec<tags::Model>,
}

/// Filter options for listing posts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    /// Only posts in this category.
    pub category_id: Option<i32>,
    /// Only posts by this author.
    pub author_id: Option<i32>,
}

/// Post repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Creates a new post repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a post and links its tags.
    ///
    /// # Errors
    ///
    /// Returns `PostError::InvalidReference` if the author, the category or
    /// any tag does not exist; nothing is written in that case.
    pub async fn create(&self, req: CreatePostRequest) -> Result<PostWithTags, PostError> {
        let txn = self.db.begin().await?;

        ensure_author(&txn, req.author_id).await?;
        ensure_category(&txn, req.category_id).await?;
        let tags = resolve_tags(&txn, &req.tag_ids).await?;

        let now = now();
        let post = posts::ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            content: Set(req.content),
            image_url: Set(None),
            author_id: Set(req.author_id),
            category_id: Set(req.category_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(reference_error)?;

        attach_tags(&txn, post.id, &tags).await?;
        txn.commit().await?;

        info!(post_id = post.id, author_id = post.author_id, tags = tags.len(), "Post created");
        Ok(PostWithTags { post, tags })
    }

    /// Finds a post with its tags.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<PostWithTags>, DbErr> {
        let Some(post) = posts::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let tags = tags_for_post(&self.db, &post).await?;
        Ok(Some(PostWithTags { post, tags }))
    }

    /// Lists posts newest first, with the total count matching `filter`.
    pub async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostWithTags>, u64), DbErr> {
        let mut query = posts::Entity::find();
        if let Some(category_id) = filter.category_id {
            query = query.filter(posts::Column::CategoryId.eq(category_id));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(posts::Column::AuthorId.eq(author_id));
        }

        let total = query.clone().count(&self.db).await?;
        let posts = query
            .order_by_desc(posts::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        let mut tags_by_post = tags_for_posts(&self.db, posts.iter().map(|p| p.id)).await?;
        let items = posts
            .into_iter()
            .map(|post| PostWithTags {
                tags: tags_by_post.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect();

        Ok((items, total))
    }

    /// Updates the given fields. `tag_ids`, when present, replaces the tag set.
    ///
    /// Returns `None` if the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns `PostError::InvalidReference` for an unknown category or tag.
    pub async fn update(
        &self,
        id: i32,
        req: UpdatePostRequest,
    ) -> Result<Option<PostWithTags>, PostError> {
        let txn = self.db.begin().await?;

        let Some(current) = posts::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        if let Some(category_id) = req.category_id {
            ensure_category(&txn, category_id).await?;
        }
        let replacement = match &req.tag_ids {
            Some(tag_ids) => Some(resolve_tags(&txn, tag_ids).await?),
            None => None,
        };

        let mut post = current.into_active_model();
        if let Some(title) = req.title {
            post.title = Set(title);
        }
        if let Some(description) = req.description {
            post.description = Set(Some(description));
        }
        if let Some(content) = req.content {
            post.content = Set(content);
        }
        if let Some(category_id) = req.category_id {
            post.category_id = Set(category_id);
        }
        post.updated_at = Set(now());
        let post = post.update(&txn).await.map_err(reference_error)?;

        let tags = match replacement {
            Some(tags) => {
                post_tags::Entity::delete_many()
                    .filter(post_tags::Column::PostId.eq(post.id))
                    .exec(&txn)
                    .await?;
                attach_tags(&txn, post.id, &tags).await?;
                tags
            }
            None => tags_for_post(&txn, &post).await?,
        };

        txn.commit().await?;
        Ok(Some(PostWithTags { post, tags }))
    }

    /// Points the post at a newly stored cover image.
    ///
    /// Returns `None` if the post does not exist, including when it is
    /// deleted while the image is being written.
    pub async fn set_image_url(&self, id: i32, url: String) -> Result<Option<PostWithTags>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(current) = posts::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let Some(post) = write_image_url(&txn, current, url).await? else {
            return Ok(None);
        };
        let tags = tags_for_post(&txn, &post).await?;

        txn.commit().await?;
        Ok(Some(PostWithTags { post, tags }))
    }

    /// Deletes a post with its comments and tag links.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = posts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<PostWithTags> for PostResponse {
    fn from(value: PostWithTags) -> Self {
        let PostWithTags { post, tags } = value;
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            content: post.content,
            image_url: post.image_url,
            author_id: post.author_id,
            category_id: post.category_id,
            tags: tags.into_iter().map(Into::into).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

async fn ensure_author<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), PostError> {
    if users::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(PostError::InvalidReference(format!("author {id} does not exist")));
    }
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), PostError> {
    if categories::Entity::find_by_id(id).one(conn).await?.is_none() {
        return Err(PostError::InvalidReference(format!("category {id} does not exist")));
    }
    Ok(())
}

/// Load the tags named by `tag_ids`, ignoring duplicates.
async fn resolve_tags<C: ConnectionTrait>(
    conn: &C,
    tag_ids: &[i32],
) -> Result<Vec<tags::Model>, PostError> {
    let mut ids = tag_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = tags::Entity::find()
        .filter(tags::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(tags::Column::Id)
        .all(conn)
        .await?;

    if let Some(missing) = ids.iter().find(|id| !found.iter().any(|tag| tag.id == **id)) {
        return Err(PostError::InvalidReference(format!("tag {missing} does not exist")));
    }
    Ok(found)
}

async fn attach_tags<C: ConnectionTrait>(
    conn: &C,
    post_id: i32,
    tags: &[tags::Model],
) -> Result<(), DbErr> {
    if tags.is_empty() {
        return Ok(());
    }
    post_tags::Entity::insert_many(tags.iter().map(|tag| post_tags::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(tag.id),
    }))
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

async fn write_image_url<C: ConnectionTrait>(
    conn: &C,
    current: posts::Model,
    url: String,
) -> Result<Option<posts::Model>, DbErr> {
    let mut post = current.into_active_model();
    post.image_url = Set(Some(url));
    post.updated_at = Set(now());
    missing_as_none(post.update(conn).await)
}

async fn tags_for_post<C: ConnectionTrait>(
    conn: &C,
    post: &posts::Model,
) -> Result<Vec<tags::Model>, DbErr> {
    post.find_related(tags::Entity)
        .order_by_asc(tags::Column::Id)
        .all(conn)
        .await
}

/// Tags of several posts in one query, keyed by post ID.
async fn tags_for_posts<C: ConnectionTrait>(
    conn: &C,
    post_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, Vec<tags::Model>>, DbErr> {
    let links = post_tags::Entity::find()
        .filter(post_tags::Column::PostId.is_in(post_ids))
        .order_by_asc(post_tags::Column::TagId)
        .find_also_related(tags::Entity)
        .all(conn)
        .await?;

    let mut by_post: HashMap<i32, Vec<tags::Model>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            by_post.entry(link.post_id).or_default().push(tag);
        }
    }
    Ok(by_post)
}

/// Foreign-key failures that slipped past the existence checks.
fn reference_error(e: DbErr) -> PostError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => PostError::InvalidReference(msg),
        _ => PostError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::comments;
    use crate::repositories::{CategoryRepository, TagRepository, UserRepository};
    use crate::test_utils::setup_test_db;
    use quill_core::users::{CreateUserInput, UserStore};
    use quill_shared::dto::{CreateCategoryRequest, CreateTagRequest};

    struct Fixture {
        db: DatabaseConnection,
        repo: PostRepository,
        author_id: i32,
        category_id: i32,
        tag_ids: Vec<i32>,
    }

    async fn fixture() -> Fixture {
        let db = setup_test_db().await;

        let author = UserRepository::new(db.clone())
            .insert(CreateUserInput {
                name: "Author".to_string(),
                email: "author@example.com".to_string(),
                phone: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let category = CategoryRepository::new(db.clone())
            .create(CreateCategoryRequest {
                name: "News".to_string(),
                description: None,
                image_url: None,
            })
            .await
            .unwrap();
        let tag_repo = TagRepository::new(db.clone());
        let mut tag_ids = Vec::new();
        for name in ["rust", "web", "db"] {
            let tag = tag_repo
                .create(CreateTagRequest {
                    name: name.to_string(),
                    description: None,
                })
                .await
                .unwrap();
            tag_ids.push(tag.id);
        }

        Fixture {
            repo: PostRepository::new(db.clone()),
            db,
            author_id: author.id,
            category_id: category.id,
            tag_ids,
        }
    }

    fn create_req(fx: &Fixture, title: &str, tag_ids: Vec<i32>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            description: None,
            content: "Body".to_string(),
            author_id: fx.author_id,
            category_id: fx.category_id,
            tag_ids,
        }
    }

    #[tokio::test]
    async fn test_create_with_tags() {
        let fx = fixture().await;
        let ids = vec![fx.tag_ids[1], fx.tag_ids[0], fx.tag_ids[1]];

        let created = fx.repo.create(create_req(&fx, "Hello", ids)).await.unwrap();
        let tag_names: Vec<_> = created.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, ["rust", "web"]);

        let found = fx.repo.find_by_id(created.post.id).await.unwrap().unwrap();
        assert_eq!(found.tags.len(), 2);
        assert_eq!(found.post.title, "Hello");
    }

    #[tokio::test]
    async fn test_unknown_references_write_nothing() {
        let fx = fixture().await;

        let mut bad_author = create_req(&fx, "A", vec![]);
        bad_author.author_id = 999;
        assert!(matches!(
            fx.repo.create(bad_author).await,
            Err(PostError::InvalidReference(msg)) if msg.contains("author")
        ));

        let mut bad_category = create_req(&fx, "B", vec![]);
        bad_category.category_id = 999;
        assert!(matches!(
            fx.repo.create(bad_category).await,
            Err(PostError::InvalidReference(msg)) if msg.contains("category")
        ));

        let bad_tag = create_req(&fx, "C", vec![fx.tag_ids[0], 999]);
        assert!(matches!(
            fx.repo.create(bad_tag).await,
            Err(PostError::InvalidReference(msg)) if msg == "tag 999 does not exist"
        ));

        let (posts, total) = fx.repo.list(PostFilter::default(), 0, 10).await.unwrap();
        assert_eq!(total, 0);
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_attaches_tags() {
        let fx = fixture().await;
        fx.repo
            .create(create_req(&fx, "First", vec![fx.tag_ids[0]]))
            .await
            .unwrap();
        fx.repo
            .create(create_req(&fx, "Second", vec![fx.tag_ids[1], fx.tag_ids[2]]))
            .await
            .unwrap();

        let (posts, total) = fx
            .repo
            .list(
                PostFilter {
                    author_id: Some(fx.author_id),
                    ..Default::default()
                },
                0,
                10,
            )
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(posts[0].post.title, "Second");
        assert_eq!(posts[0].tags.len(), 2);
        assert_eq!(posts[1].tags.len(), 1);

        let (none, total) = fx
            .repo
            .list(
                PostFilter {
                    category_id: Some(fx.category_id + 1),
                    ..Default::default()
                },
                0,
                10,
            )
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_tag_set() {
        let fx = fixture().await;
        let created = fx
            .repo
            .create(create_req(&fx, "Post", vec![fx.tag_ids[0], fx.tag_ids[1]]))
            .await
            .unwrap();

        let updated = fx
            .repo
            .update(
                created.post.id,
                UpdatePostRequest {
                    title: Some("Renamed".to_string()),
                    tag_ids: Some(vec![fx.tag_ids[2]]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("post exists");
        assert_eq!(updated.post.title, "Renamed");
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].id, fx.tag_ids[2]);

        // Leaving tag_ids out keeps the current set.
        let kept = fx
            .repo
            .update(
                created.post.id,
                UpdatePostRequest {
                    content: Some("New body".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("post exists");
        assert_eq!(kept.tags.len(), 1);
        assert_eq!(kept.post.content, "New body");
    }

    #[tokio::test]
    async fn test_update_unknown_tag_keeps_old_set() {
        let fx = fixture().await;
        let created = fx
            .repo
            .create(create_req(&fx, "Post", vec![fx.tag_ids[0]]))
            .await
            .unwrap();

        let result = fx
            .repo
            .update(
                created.post.id,
                UpdatePostRequest {
                    tag_ids: Some(vec![12345]),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(PostError::InvalidReference(_))));

        let found = fx.repo.find_by_id(created.post.id).await.unwrap().unwrap();
        assert_eq!(found.tags.len(), 1);
        assert!(fx
            .repo
            .update(777, UpdatePostRequest::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_image_url_and_delete_cascades() {
        let fx = fixture().await;
        let created = fx
            .repo
            .create(create_req(&fx, "Post", vec![fx.tag_ids[0]]))
            .await
            .unwrap();

        let with_image = fx
            .repo
            .set_image_url(created.post.id, "/uploads/posts/a.png".to_string())
            .await
            .unwrap()
            .expect("post exists");
        assert_eq!(with_image.post.image_url.as_deref(), Some("/uploads/posts/a.png"));
        assert_eq!(with_image.tags.len(), 1);

        assert!(fx.repo.delete(created.post.id).await.unwrap());
        assert_eq!(post_tags::Entity::find().count(&fx.db).await.unwrap(), 0);
        assert_eq!(comments::Entity::find().count(&fx.db).await.unwrap(), 0);
        assert!(!fx.repo.delete(created.post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_image_for_deleted_post_is_none() {
        let fx = fixture().await;
        let created = fx.repo.create(create_req(&fx, "Post", vec![])).await.unwrap();
        let id = created.post.id;
        assert!(fx.repo.delete(id).await.unwrap());

        // The row was looked up before the delete landed.
        let written = write_image_url(&fx.db, created.post, "/uploads/posts/a.png".to_string())
            .await
            .unwrap();
        assert!(written.is_none());
        assert!(fx
            .repo
            .set_image_url(id, "/uploads/posts/b.png".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_deleting_category_removes_its_posts() {
        let fx = fixture().await;
        fx.repo.create(create_req(&fx, "Post", vec![])).await.unwrap();

        CategoryRepository::new(fx.db.clone())
            .delete(fx.category_id)
            .await
            .unwrap();

        assert_eq!(posts::Entity::find().count(&fx.db).await.unwrap(), 0);
    }
}
