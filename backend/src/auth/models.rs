//! Data structures for authentication-related entities.
//!
//! This module defines request payloads for signup, login, and the
//! password-recovery flow, plus the response shapes returned by the auth
//! endpoints.

use crate::database::models::{UserProfile, VerificationPair, validate_password_strength};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
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

/// Login request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Email-only payload opening the recovery flow
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyUserRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,
}

/// Security-answer payload for the second recovery step
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyQuestionRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
}

/// Final recovery step: the replacement password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8-100 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

/// Signed session produced by login and signup
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserProfile,
}

/// Body returned by login/signup; the access token travels only in the
/// session cookie, the CSRF token in both body and cookie.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserProfile,
    pub csrf_token: String,
}

/// Current session identity, straight from the token claims
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: String,
    pub name: String,
}

/// Fresh CSRF token issued on demand
#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// The stored security question, returned by verify-user
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
}
