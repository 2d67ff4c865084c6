//! User business logic service.
//!
//! Handles user CRUD operations and credential hashing. All hashing
//! happens here, at the point of creation or mutation, never inside the
//! persistence layer.

use crate::api::common::PaginationFilter;
use crate::database::models::{CreateNewUser, CreateUser, UpdateUser, UpdateUserRecord, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use bcrypt::{DEFAULT_COST, hash, verify};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user with full validation.
    ///
    /// # Arguments
    /// * `create_user` - User creation data with plaintext credentials
    ///
    /// # Returns
    /// The newly created User with all fields populated
    ///
    /// # Errors
    /// Returns `ServiceError` for validation failures, duplicate emails,
    /// or persistence failures.
    pub async fn create_user(&self, create_user: CreateNewUser) -> ServiceResult<User> {
        if let Err(validation_errors) = create_user.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        let repo = UserRepository::new(self.pool);

        if repo.email_exists(&create_user.email).await? {
            return Err(ServiceError::email_already_in_use());
        }

        let password_hash = Self::hash_password(&create_user.password)?;
        let security_answer_hash = Self::hash_password(&create_user.verification.answer)?;

        let data = CreateUser {
            id: Uuid::now_v7().to_string(),
            name: create_user.name,
            email: create_user.email,
            password_hash,
            security_question: create_user.verification.question,
            security_answer_hash,
        };

        let user = repo.create_user(data).await?;
        tracing::info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::UserNotFound` if the user doesn't exist
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(id))?;
        Ok(user)
    }

    /// Retrieves a user by email with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::UserNotFound` if the user doesn't exist
    pub async fn get_user_by_email_required(&self, email: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(email))?;
        Ok(user)
    }

    /// Retrieves a page of users together with the total count.
    pub async fn list_users(&self, pagination: &PaginationFilter) -> ServiceResult<(Vec<User>, u64)> {
        let repo = UserRepository::new(self.pool);
        let users = repo.get_users(pagination).await?;
        let total = repo.count_users().await?;
        Ok((users, total))
    }

    /// Applies a partial update to a user found by id.
    ///
    /// Plaintext password or verification answer in the update are hashed
    /// here before anything is written.
    pub async fn update_user(&self, id: &str, update: UpdateUser) -> ServiceResult<User> {
        if let Err(validation_errors) = update.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        let record = Self::hash_update(update)?;
        let repo = UserRepository::new(self.pool);
        let user = repo
            .update_user_by_id(id, record)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(id))?;

        tracing::info!("Updated user {}", user.id);
        Ok(user)
    }

    /// Applies a partial update to a user found by email. This is the
    /// administrative route through which `blocked` status is set.
    pub async fn update_user_by_email(
        &self,
        email: &str,
        update: UpdateUser,
    ) -> ServiceResult<User> {
        if let Err(validation_errors) = update.validate() {
            return Err(Self::validation_error(validation_errors));
        }

        let record = Self::hash_update(update)?;
        let repo = UserRepository::new(self.pool);
        let user = repo
            .update_user_by_email(email, record)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(email))?;

        tracing::info!("Updated user {} by email", user.id);
        Ok(user)
    }

    /// Deletes a user by id.
    ///
    /// # Errors
    /// Returns `ServiceError::UserNotFound` if no row matched
    pub async fn delete_user(&self, id: &str) -> ServiceResult<()> {
        let repo = UserRepository::new(self.pool);
        if !repo.delete_user(id).await? {
            return Err(ServiceError::user_not_found(id));
        }
        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    /// Function to hash a password or security answer before storage.
    ///
    /// # Errors
    /// Returns `ServiceError` if hashing fails
    pub fn hash_password(password: &str) -> ServiceResult<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Function to verify a plaintext value against a stored hash.
    ///
    /// # Errors
    /// Returns `ServiceError` if the verification process itself fails
    pub fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        verify(password, hash)
            .map_err(|e| ServiceError::internal(format!("Password verification failed: {}", e)))
    }

    /// Converts an API-level update into its hashed repository form.
    fn hash_update(update: UpdateUser) -> ServiceResult<UpdateUserRecord> {
        let password_hash = update
            .password
            .as_deref()
            .map(Self::hash_password)
            .transpose()?;

        let (security_question, security_answer_hash) = match update.verification {
            Some(pair) => (Some(pair.question), Some(Self::hash_password(&pair.answer)?)),
            None => (None, None),
        };

        Ok(UpdateUserRecord {
            name: update.name,
            password_hash,
            security_question,
            security_answer_hash,
            status: update.status,
        })
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
