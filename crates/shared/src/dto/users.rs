//! User account payloads.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub name: String,
    /// Login email, unique across users.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// Plaintext password; hashed before it is stored.
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    /// Optional phone number, unique across users.
    #[serde(default)]
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
}

/// Body of `PATCH /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub name: Option<String>,
    /// New email.
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// New phone number.
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    /// New image URL.
    pub image_url: Option<String>,
    /// New plaintext password.
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// True when the request would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.image_url.is_none()
            && self.password.is_none()
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    /// User ID.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Profile image URL.
    pub image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last modification time.
    pub updated_at: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register("ada@example.com", "correct horse").validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let errors = register("not-an-email", "correct horse")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_request_rejects_short_password() {
        let errors = register("ada@example.com", "short").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_update_request_empty() {
        assert!(UpdateUserRequest::default().is_empty());
        let req = UpdateUserRequest {
            name: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!req.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_deserializes_partial_body() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"phone":"+15550100"}"#).expect("valid json");
        assert_eq!(req.phone.as_deref(), Some("+15550100"));
        assert!(req.email.is_none());
    }
}
