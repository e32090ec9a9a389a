//! User records and profile images.
//!
//! [`UserService`] owns the rules (password hashing, image placement) and
//! reaches the database through the [`UserStore`] trait, which the db crate
//! implements.

mod error;
mod service;
mod types;

pub use error::UserError;
pub use service::{USER_MEDIA_SUBDIR, UserService, UserStore};
pub use types::{CreateUserInput, NewUser, User, UserChanges, UserUpdate};
