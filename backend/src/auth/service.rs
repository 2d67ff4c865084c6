//! Core business logic for the authentication system.
//!
//! `AuthService` validates credentials, issues signed session tokens, and
//! drives the account status state machine behind the password-recovery
//! flow. Status writes go through conditional updates keyed on the status
//! read at the top of each operation, so concurrent requests on the same
//! email cannot silently overwrite each other.

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::{CreateUser, UserProfile, UserStatus};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Authentication service handling signup, login, and password recovery
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: JwtUtils,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance with explicit collaborators
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        AuthService {
            pool,
            jwt_utils: JwtUtils::new(config),
        }
    }

    /// Register a new account and open a session for it.
    ///
    /// Password and security answer are hashed before storage. A lookup
    /// failure during the duplicate check deliberately reads as "no
    /// existing user"; the unique email index is the final guard.
    pub async fn sign_up(&self, request: SignupRequest) -> ServiceResult<AuthSession> {
        if let Err(validation_errors) = request.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        tracing::info!("Signup attempt for email: {}", request.email);
        let repo = UserRepository::new(self.pool);

        let existing = repo.get_user_by_email(&request.email).await.ok().flatten();
        if existing.is_some() {
            tracing::warn!("Email already in use during signup attempt: {}", request.email);
            return Err(ServiceError::email_already_in_use());
        }

        let password_hash = UserService::hash_password(&request.password)?;
        let security_answer_hash = UserService::hash_password(&request.verification.answer)?;

        let user = repo
            .create_user(CreateUser {
                id: Uuid::now_v7().to_string(),
                name: request.name,
                email: request.email,
                password_hash,
                security_question: request.verification.question,
                security_answer_hash,
            })
            .await?;

        tracing::info!("Signup successful for email: {}", user.email);
        let access_token = self.sign_token(&user.name, &user.email)?;
        Ok(AuthSession {
            access_token,
            user: UserProfile::from(user),
        })
    }

    /// Authenticate a user and open a session.
    ///
    /// Refused outright while a password reset is pending. A successful
    /// login promotes any other non-active status back to `active`,
    /// `blocked` included.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        if let Err(validation_errors) = request.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        tracing::info!("Login attempt for email: {}", request.email);
        let repo = UserRepository::new(self.pool);

        let Some(user) = repo.get_user_by_email(&request.email).await? else {
            tracing::warn!("User not found during login attempt: {}", request.email);
            return Err(ServiceError::invalid_credentials());
        };

        if user.status == UserStatus::PendingReset {
            tracing::warn!(
                "Login blocked for user with pending-reset status: {}",
                request.email
            );
            return Err(ServiceError::pending_reset_blocked());
        }

        if !UserService::verify_password(&request.password, &user.password_hash)? {
            tracing::warn!(
                "Password mismatch during login attempt for email: {}",
                request.email
            );
            return Err(ServiceError::invalid_credentials());
        }

        if user.status != UserStatus::Active {
            if !repo
                .update_status_from(&user.email, user.status, UserStatus::Active)
                .await?
            {
                return Err(ServiceError::concurrent_update(&user.email));
            }
        }

        tracing::info!("Login successful for email: {}", user.email);
        let access_token = self.sign_token(&user.name, &user.email)?;
        let mut profile = UserProfile::from(user);
        profile.status = UserStatus::Active;
        Ok(AuthSession {
            access_token,
            user: profile,
        })
    }

    /// First recovery step: confirm the account exists and hand back its
    /// security question. Marks the account `verified` from any status.
    ///
    /// Lookup failures read as "user not found", matching the signup
    /// duplicate check.
    pub async fn validate_user(&self, request: VerifyUserRequest) -> ServiceResult<String> {
        if let Err(validation_errors) = request.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        tracing::info!("Validate user attempt for email: {}", request.email);
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_email(&request.email)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                tracing::warn!("User not found during validate user attempt: {}", request.email);
                ServiceError::user_not_found(&request.email)
            })?;

        if !repo
            .update_status_from(&user.email, user.status, UserStatus::Verified)
            .await?
        {
            return Err(ServiceError::concurrent_update(&user.email));
        }

        tracing::info!("User validated successfully for email: {}", user.email);
        Ok(user.security_question)
    }

    /// Second recovery step: check the security answer. A correct answer
    /// moves the account to `pending-reset`, which blocks login until the
    /// reset completes.
    pub async fn validate_question(
        &self,
        request: VerifyQuestionRequest,
    ) -> ServiceResult<UserProfile> {
        if let Err(validation_errors) = request.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        tracing::info!("Validate question attempt for email: {}", request.email);
        let repo = UserRepository::new(self.pool);

        let Some(user) = repo.get_user_by_email(&request.email).await? else {
            tracing::warn!(
                "User not found during validate question for email: {}",
                request.email
            );
            return Err(ServiceError::user_not_found(&request.email));
        };

        if !UserService::verify_password(&request.answer, &user.security_answer_hash)? {
            tracing::warn!("Answer mismatch during validate question for email: {}", request.email);
            return Err(ServiceError::invalid_security_answer());
        }

        if !repo
            .update_status_from(&user.email, user.status, UserStatus::PendingReset)
            .await?
        {
            return Err(ServiceError::concurrent_update(&user.email));
        }

        tracing::info!("Answer validated successfully for email: {}", user.email);
        let mut profile = UserProfile::from(user);
        profile.status = UserStatus::PendingReset;
        Ok(profile)
    }

    /// Final recovery step: store the new password hash and return the
    /// account to `active`.
    pub async fn reset_password(
        &self,
        request: ResetPasswordRequest,
    ) -> ServiceResult<UserProfile> {
        if let Err(validation_errors) = request.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        tracing::info!("Reset password attempt for email: {}", request.email);
        let repo = UserRepository::new(self.pool);

        let Some(user) = repo.get_user_by_email(&request.email).await? else {
            tracing::warn!(
                "User not found during reset password for email: {}",
                request.email
            );
            return Err(ServiceError::user_not_found(&request.email));
        };

        let password_hash = UserService::hash_password(&request.password)?;

        if !repo
            .reset_credentials(&user.email, &password_hash, user.status)
            .await?
        {
            return Err(ServiceError::concurrent_update(&user.email));
        }

        tracing::info!("Reset password successful for email: {}", user.email);
        let mut profile = UserProfile::from(user);
        profile.status = UserStatus::Active;
        Ok(profile)
    }

    /// Build the claim set and sign a session token for the account
    fn sign_token(&self, name: &str, email: &str) -> ServiceResult<String> {
        tracing::info!("Signing new token for email: {}", email);
        self.jwt_utils
            .generate_token(name.to_string(), email.to_string())
    }

    /// Flattens validator output into a single validation error.
    fn validation_error(errors: validator::ValidationErrors) -> ServiceError {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        ServiceError::validation(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{UpdateUser, VerificationPair};
    use crate::database::test_pool;
    use crate::services::user_service::UserService;

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_seconds: 3600,
            server_port: 0,
        }
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Tarek Samy".to_string(),
            email: email.to_string(),
            password: "P@ssw0rd".to_string(),
            verification: VerificationPair {
                question: "What is your favorite color?".to_string(),
                answer: "blue".to_string(),
            },
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn status_of(pool: &SqlitePool, email: &str) -> UserStatus {
        UserRepository::new(pool)
            .get_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn signup_then_login_succeeds_with_active_status() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let session = service.sign_up(signup_request("a@test.com")).await.unwrap();
        assert!(!session.access_token.is_empty());
        assert_eq!(session.user.status, UserStatus::Active);

        let session = service
            .login(login_request("a@test.com", "P@ssw0rd"))
            .await
            .unwrap();
        assert_eq!(session.user.status, UserStatus::Active);
        assert_eq!(session.user.email, "a@test.com");
    }

    #[tokio::test]
    async fn signup_issues_a_verifiable_token() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let session = service.sign_up(signup_request("a@test.com")).await.unwrap();
        let claims = JwtUtils::new(&config)
            .validate_token(&session.access_token)
            .unwrap();
        assert_eq!(claims.email(), "a@test.com");
        assert_eq!(claims.name(), "Tarek Samy");
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email_without_mutating_the_account() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();

        let mut second = signup_request("a@test.com");
        second.name = "Someone Else".to_string();
        let err = service.sign_up(second).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmailAlreadyInUse));

        let stored = UserRepository::new(&pool)
            .get_user_by_email("a@test.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Tarek Samy");
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_invalid_credentials() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let err = service
            .login(login_request("nobody@test.com", "P@ssw0rd"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        let err = service
            .login(login_request("a@test.com", "Wr0ngpassword"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_is_blocked_while_reset_is_pending_even_with_correct_password() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        service
            .validate_user(VerifyUserRequest {
                email: "a@test.com".to_string(),
            })
            .await
            .unwrap();
        service
            .validate_question(VerifyQuestionRequest {
                email: "a@test.com".to_string(),
                answer: "blue".to_string(),
            })
            .await
            .unwrap();

        let err = service
            .login(login_request("a@test.com", "P@ssw0rd"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PendingResetBlocked));
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::PendingReset);
    }

    #[tokio::test]
    async fn login_promotes_a_verified_account_back_to_active() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        service
            .validate_user(VerifyUserRequest {
                email: "a@test.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Verified);

        let session = service
            .login(login_request("a@test.com", "P@ssw0rd"))
            .await
            .unwrap();
        assert_eq!(session.user.status, UserStatus::Active);
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Active);
    }

    #[tokio::test]
    async fn blocked_status_does_not_gate_login() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        UserService::new(&pool)
            .update_user_by_email(
                "a@test.com",
                UpdateUser {
                    status: Some(UserStatus::Blocked),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = service
            .login(login_request("a@test.com", "P@ssw0rd"))
            .await
            .unwrap();
        assert_eq!(session.user.status, UserStatus::Active);
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Active);
    }

    #[tokio::test]
    async fn validate_user_on_unknown_email_is_not_found() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let err = service
            .validate_user(VerifyUserRequest {
                email: "nobody@test.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn validate_user_returns_the_stored_question_and_marks_verified() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        let question = service
            .validate_user(VerifyUserRequest {
                email: "a@test.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(question, "What is your favorite color?");
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Verified);
    }

    #[tokio::test]
    async fn wrong_security_answer_is_rejected_and_leaves_status_unchanged() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        service
            .validate_user(VerifyUserRequest {
                email: "a@test.com".to_string(),
            })
            .await
            .unwrap();

        let err = service
            .validate_question(VerifyQuestionRequest {
                email: "a@test.com".to_string(),
                answer: "red".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSecurityAnswer));
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Verified);
    }

    #[tokio::test]
    async fn full_recovery_round_trip_ends_active_with_the_new_password() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();

        service
            .validate_user(VerifyUserRequest {
                email: "a@test.com".to_string(),
            })
            .await
            .unwrap();
        let profile = service
            .validate_question(VerifyQuestionRequest {
                email: "a@test.com".to_string(),
                answer: "blue".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(profile.status, UserStatus::PendingReset);

        let profile = service
            .reset_password(ResetPasswordRequest {
                email: "a@test.com".to_string(),
                password: "N3wpassword".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(profile.status, UserStatus::Active);

        // Old password no longer works, the new one does.
        assert!(matches!(
            service
                .login(login_request("a@test.com", "P@ssw0rd"))
                .await
                .unwrap_err(),
            ServiceError::InvalidCredentials
        ));
        let session = service
            .login(login_request("a@test.com", "N3wpassword"))
            .await
            .unwrap();
        assert_eq!(session.user.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn reset_password_on_unknown_email_is_not_found() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        let err = service
            .reset_password(ResetPasswordRequest {
                email: "nobody@test.com".to_string(),
                password: "N3wpassword".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn stale_conditional_update_affects_no_rows() {
        let pool = test_pool().await;
        let config = test_config();
        let service = AuthService::new(&pool, &config);

        service.sign_up(signup_request("a@test.com")).await.unwrap();
        let repo = UserRepository::new(&pool);

        // Account is active; an update expecting verified must lose.
        let updated = repo
            .update_status_from("a@test.com", UserStatus::Verified, UserStatus::PendingReset)
            .await
            .unwrap();
        assert!(!updated);
        assert_eq!(status_of(&pool, "a@test.com").await, UserStatus::Active);
    }
}
