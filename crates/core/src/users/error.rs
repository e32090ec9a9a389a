//! User service error types.

use thiserror::Error;

use crate::auth::PasswordError;
use crate::storage::StorageError;

/// User operation errors.
///
/// Missing users are not errors; operations return `Option`/`bool` instead.
#[derive(Debug, Error)]
pub enum UserError {
    /// Email or phone already belongs to another user.
    #[error("user with this {field} already exists")]
    Duplicate {
        /// Column that collided (`email` or `phone`).
        field: String,
    },

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Profile image could not be stored.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Persistence failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl UserError {
    /// Create a duplicate error for `field`.
    #[must_use]
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
