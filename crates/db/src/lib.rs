//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for users, categories, tags, posts and comments
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

#[cfg(test)]
mod test_utils;

pub use repositories::{
    CategoryRepository, CommentError, CommentRepository, PostError, PostFilter, PostRepository,
    PostWithTags, TagRepository, UserRepository,
};

use quill_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
