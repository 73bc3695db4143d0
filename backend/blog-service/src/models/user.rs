use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::{Validate, ValidationError};

use super::taxonomy::invalid;

/// Author account
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Credentials submitted at registration
#[derive(Clone, Validate)]
pub struct Registration {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Usernames follow the usual web-framework rule: 1-150 characters drawn from
/// letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len == 0 || len > 150 {
        return Err(invalid(
            "username_length",
            "must be between 1 and 150 characters".to_string(),
        ));
    }

    if let Some(bad) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
    {
        return Err(invalid(
            "username_chars",
            format!("contains invalid character '{}'", bad),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("James").is_ok());
        assert!(validate_username("trump_2024").is_ok());
        assert!(validate_username("me@example.com").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_registration_collects_both_fields() {
        let registration = Registration {
            username: "has space".to_string(),
            password: "short".to_string(),
        };
        let errors = registration.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
