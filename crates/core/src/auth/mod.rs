//! Credential handling.
//!
//! Only password hashing lives here; sessions and tokens are out of scope.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
