//! Category, tag, post and comment payloads.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::PageRequest;

// ============================================================================
// Categories
// ============================================================================

/// Body of `POST /categories`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body of `PATCH /categories/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New cover image URL.
    pub image_url: Option<String>,
}

/// Public view of a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    /// Category ID.
    pub id: i32,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
}

// ============================================================================
// Tags
// ============================================================================

/// Body of `POST /tags`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTagRequest {
    /// Tag name.
    #[validate(length(min = 1, max = 100, message = "must not be empty"))]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PATCH /tags/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTagRequest {
    /// New name.
    #[validate(length(min = 1, max = 100, message = "must not be empty"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Public view of a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    /// Tag ID.
    pub id: i32,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

// ============================================================================
// Posts
// ============================================================================

/// Body of `POST /posts`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post title.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub title: String,
    /// Short summary.
    #[serde(default)]
    pub description: Option<String>,
    /// Body text.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    /// Author (user) ID.
    pub author_id: i32,
    /// Category ID.
    pub category_id: i32,
    /// Tags to attach.
    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

/// Body of `PATCH /posts/{id}`.
///
/// `tag_ids`, when present, replaces the whole tag set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New title.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub title: Option<String>,
    /// New summary.
    pub description: Option<String>,
    /// New body text.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: Option<String>,
    /// Move to another category.
    pub category_id: Option<i32>,
    /// Replacement tag set.
    pub tag_ids: Option<Vec<i32>>,
}

/// Query string of `GET /posts`.
///
/// Kept flat (no `#[serde(flatten)]`) because url-encoded numbers do not
/// survive flattening.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Only posts in this category.
    pub category_id: Option<i32>,
    /// Only posts by this author.
    pub author_id: Option<i32>,
}

impl PostListQuery {
    /// Pagination part of the query.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// Public view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: i32,
    /// Title.
    pub title: String,
    /// Summary.
    pub description: Option<String>,
    /// Body text.
    pub content: String,
    /// Cover image URL.
    pub image_url: Option<String>,
    /// Author ID.
    pub author_id: i32,
    /// Category ID.
    pub category_id: i32,
    /// Attached tags.
    pub tags: Vec<TagResponse>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
}

// ============================================================================
// Comments
// ============================================================================

/// Body of `POST /posts/{id}/comments`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Commenting user.
    pub user_id: i32,
    /// Comment text.
    #[validate(length(min = 1, max = 10_000, message = "must not be empty"))]
    pub message: String,
}

/// Body of `PATCH /comments/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// Replacement text.
    #[validate(length(min = 1, max = 10_000, message = "must not be empty"))]
    pub message: String,
}

/// Public view of a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    /// Comment ID.
    pub id: i32,
    /// Post commented on.
    pub post_id: i32,
    /// Author of the comment.
    pub user_id: i32,
    /// Comment text.
    pub message: String,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
}
