//! Request and response bodies of the HTTP API.

pub mod content;
pub mod users;

pub use content::{
    CategoryResponse, CommentResponse, CreateCategoryRequest, CreateCommentRequest,
    CreatePostRequest, CreateTagRequest, PostListQuery, PostResponse, TagResponse,
    UpdateCategoryRequest, UpdateCommentRequest, UpdatePostRequest, UpdateTagRequest,
};
pub use users::{RegisterUserRequest, UpdateUserRequest, UserResponse};
