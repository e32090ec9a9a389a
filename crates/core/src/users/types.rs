//! User domain types.

use chrono::{DateTime, FixedOffset};
use quill_shared::dto::{RegisterUserRequest, UpdateUserRequest, UserResponse};

/// A stored user, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Unique phone number.
    pub phone: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Public URL of the profile image.
    pub image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
}

/// Registration input with a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Unique phone number.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: String,
}

/// Row handed to [`UserStore::insert`](super::UserStore::insert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Unique phone number.
    pub phone: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Partial update with a plaintext password.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// Display name.
    pub name: Option<String>,
    /// Unique email address.
    pub email: Option<String>,
    /// Unique phone number.
    pub phone: Option<String>,
    /// Public URL of the profile image.
    pub image_url: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Columns to overwrite; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// Display name.
    pub name: Option<String>,
    /// Unique email address.
    pub email: Option<String>,
    /// Unique phone number.
    pub phone: Option<String>,
    /// Public URL of the profile image.
    pub image_url: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: Option<String>,
}

impl From<RegisterUserRequest> for NewUser {
    fn from(req: RegisterUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
        }
    }
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            phone: req.phone,
            image_url: req.image_url,
            password: req.password,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            image_url: user.image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
