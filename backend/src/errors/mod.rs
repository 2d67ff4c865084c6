//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! backend application and provides mechanisms for consistent error handling
//! and response formatting.

use thiserror::Error;

/// Domain errors raised by the authentication and user-management services.
///
/// Each variant maps to exactly one HTTP status at the API boundary; see
/// `api::common::service_error_to_http`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unknown email or password mismatch during login. Both cases share
    /// one variant so the response never reveals which part was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup or user creation attempted with an email that is taken.
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// No user record matches the given identifier.
    #[error("User not found: {identifier}")]
    UserNotFound { identifier: String },

    /// Security answer did not match the stored hash.
    #[error("Invalid security answer")]
    InvalidSecurityAnswer,

    /// Login refused while a password reset is in flight.
    #[error("Password reset pending, login is blocked until it completes")]
    PendingResetBlocked,

    /// Missing, malformed, or expired session token.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// CSRF cookie/header pair missing or mismatched.
    #[error("Invalid CSRF token, please refresh the page and try again")]
    CsrfMismatch,

    /// Malformed input rejected before reaching business logic.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A conditional status update lost the race against a concurrent
    /// writer on the same account.
    #[error("Concurrent update on user: {identifier}")]
    ConcurrentUpdate { identifier: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn email_already_in_use() -> Self {
        Self::EmailAlreadyInUse
    }

    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::UserNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn invalid_security_answer() -> Self {
        Self::InvalidSecurityAnswer
    }

    pub fn pending_reset_blocked() -> Self {
        Self::PendingResetBlocked
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn csrf_mismatch() -> Self {
        Self::CsrfMismatch
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn concurrent_update(identifier: impl Into<String>) -> Self {
        Self::ConcurrentUpdate {
            identifier: identifier.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
