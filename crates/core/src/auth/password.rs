//! Argon2id password hashing.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Password hashing failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Argon2 refused to hash the input.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored hash is not a PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Verification failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    Verify(String),
}

/// Hash `password` into a salted PHC string.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if Argon2 rejects the input.
///
/// # Example
///
/// ```
/// use quill_core::auth::hash_password;
///
/// let hash = hash_password("correct horse battery").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check `password` against a hash produced by [`hash_password`].
///
/// A mismatch is `Ok(false)`, not an error.
///
/// # Errors
///
/// Returns [`PasswordError::MalformedHash`] if `hash` cannot be parsed.
///
/// # Example
///
/// ```
/// use quill_core::auth::{hash_password, verify_password};
///
/// let hash = hash_password("s3cret-pass").unwrap();
/// assert!(verify_password("s3cret-pass", &hash).unwrap());
/// assert!(!verify_password("guess", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_and_not_plaintext() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter2hunter2"));
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("open sesame").unwrap();
        assert!(verify_password("open sesame", &hash).unwrap());
        assert!(!verify_password("open sesame!", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        assert_ne!(
            hash_password("repeat-me").unwrap(),
            hash_password("repeat-me").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "plaintext-in-db"),
            Err(PasswordError::MalformedHash)
        ));
    }
}
