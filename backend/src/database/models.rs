//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models:
//! the `User` row carries hashes that must never leave the process, so API
//! responses use the sanitized `UserProfile` view instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Account lifecycle status driving the password-recovery flow.
///
/// Transitions: any status moves to `Verified` when the recovery flow
/// confirms the email, `Verified` moves to `PendingReset` on a correct
/// security answer, and `PendingReset` returns to `Active` once the
/// password is reset. Login promotes any non-active status to `Active`,
/// except `PendingReset`, which refuses login outright. `Blocked` is set
/// only through the administrative update path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    Active,
    Verified,
    PendingReset,
    Blocked,
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Verified => write!(f, "verified"),
            UserStatus::PendingReset => write!(f, "pending-reset"),
            UserStatus::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "verified" => Ok(UserStatus::Verified),
            "pending-reset" => Ok(UserStatus::PendingReset),
            "blocked" => Ok(UserStatus::Blocked),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub security_question: String,
    pub security_answer_hash: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Security question/answer pair as submitted by the client.
///
/// The question is stored as-is; the answer is hashed before storage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerificationPair {
    #[validate(length(min = 1, max = 255, message = "Question is required"))]
    pub question: String,

    #[validate(length(min = 1, max = 255, message = "Answer is required"))]
    pub answer: String,
}

/// User creation payload with plaintext credentials, as received from the
/// API boundary. Hashing happens in the service layer before this turns
/// into a `CreateUser`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNewUser {
    #[validate(length(min = 3, max = 50, message = "Name must be between 3-50 characters"))]
    pub name: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(min = 5, max = 100, message = "Email must be between 5-100 characters")
    )]
    pub email: String,

    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8-100 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,

    #[validate(nested)]
    pub verification: VerificationPair,
}

/// Fully-hashed user record ready for insertion.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub id: String,

    #[validate(length(min = 1, max = 50, message = "Name is required"))]
    pub name: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 100, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password hash is required"))]
    pub password_hash: String,

    #[validate(length(min = 1, message = "Security question is required"))]
    pub security_question: String,

    #[validate(length(min = 1, message = "Security answer hash is required"))]
    pub security_answer_hash: String,
}

/// Partial update payload for the administrative user CRUD path.
///
/// Absent fields are left untouched. `status` here is how an account is
/// moved to `blocked`; the auth flow itself never writes that value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 50, message = "Name must be between 3-50 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8-100 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: Option<String>,

    #[validate(nested)]
    pub verification: Option<VerificationPair>,

    pub status: Option<UserStatus>,
}

/// Hashed form of `UpdateUser` applied by the repository.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRecord {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub security_question: Option<String>,
    pub security_answer_hash: Option<String>,
    pub status: Option<UserStatus>,
}

/// Sanitized user view returned by every API response. Hashes, the
/// verification pair, and storage timestamps never leave the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status,
        }
    }
}

// Custom validation function
pub fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(validator::ValidationError::new(
            "Password must contain at least one letter and one digit",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            UserStatus::Active,
            UserStatus::Verified,
            UserStatus::PendingReset,
            UserStatus::Blocked,
        ] {
            assert_eq!(UserStatus::from_str(&status.to_string()), Ok(status));
        }
        assert!(UserStatus::from_str("deleted").is_err());
    }

    #[test]
    fn default_status_is_active() {
        assert_eq!(UserStatus::default(), UserStatus::Active);
    }

    #[test]
    fn password_strength_requires_letter_and_digit() {
        assert!(validate_password_strength("P@ssw0rd").is_ok());
        assert!(validate_password_strength("lettersonly").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }
}
