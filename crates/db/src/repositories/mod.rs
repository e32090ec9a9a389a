//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod category;
pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use category::CategoryRepository;
pub use comment::{CommentError, CommentRepository};
pub use post::{PostError, PostFilter, PostRepository, PostWithTags};
pub use tag::TagRepository;
pub use user::UserRepository;

use chrono::Utc;
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Current time in the column representation.
fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

/// Treats an update that matched no row as "not found".
///
/// A row deleted between its lookup and the update makes SeaORM report
/// `RecordNotUpdated`.
fn missing_as_none<T>(result: Result<T, DbErr>) -> Result<Option<T>, DbErr> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e),
    }
}
