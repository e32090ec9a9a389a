//! `SeaORM` entity definitions.

// Column-level docs would only repeat the migration.
#![allow(missing_docs)]

pub mod categories;
pub mod comments;
pub mod post_tags;
pub mod posts;
pub mod tags;
pub mod users;
