//! Database repository for user management operations.
//!
//! Provides CRUD operations for user accounts, plus the conditional
//! status-transition updates the recovery flow relies on.

use crate::{
    api::common::PaginationFilter,
    database::models::{CreateUser, UpdateUserRecord, User, UserStatus},
};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, name, email, password_hash, security_question, \
     security_answer_hash, status, created_at, updated_at";

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity. Status
/// transitions are conditional on the caller's last-read status so two
/// requests racing on the same email cannot silently overwrite each other.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database with status `active`.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO with already-hashed credentials
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash, security_question, \
             security_answer_hash, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.security_question)
        .bind(&user.security_answer_hash)
        .bind(UserStatus::Active)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(self.pool)
                .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Retrieves a page of users ordered by creation time, newest first.
    pub async fn get_users(&self, pagination: &PaginationFilter) -> Result<Vec<User>> {
        let limit = pagination.limit();
        let offset = pagination.offset();

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get total count of users
    pub async fn count_users(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Moves a user's status from `expected` to `to` in a single
    /// conditional update.
    ///
    /// # Returns
    /// `true` if the row was updated, `false` if the stored status no
    /// longer matched `expected` (a concurrent writer won the race).
    pub async fn update_status_from(
        &self,
        email: &str,
        expected: UserStatus,
        to: UserStatus,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE email = ? AND status = ?")
                .bind(to)
                .bind(Utc::now())
                .bind(email)
                .bind(expected)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the password hash and returns the status to `active`,
    /// conditional on the status the caller last read.
    ///
    /// # Returns
    /// `true` if the row was updated, `false` on a lost race.
    pub async fn reset_credentials(
        &self,
        email: &str,
        password_hash: &str,
        expected: UserStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, status = ?, updated_at = ? \
             WHERE email = ? AND status = ?",
        )
        .bind(password_hash)
        .bind(UserStatus::Active)
        .bind(Utc::now())
        .bind(email)
        .bind(expected)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Applies a partial update to the user with the given email.
    ///
    /// Absent fields keep their stored values. This is the administrative
    /// path; it can write any status, including `blocked`.
    ///
    /// # Returns
    /// The updated User, or `None` if no row matched
    pub async fn update_user_by_email(
        &self,
        email: &str,
        update: UpdateUserRecord,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
             name = COALESCE(?, name), \
             password_hash = COALESCE(?, password_hash), \
             security_question = COALESCE(?, security_question), \
             security_answer_hash = COALESCE(?, security_answer_hash), \
             status = COALESCE(?, status), \
             updated_at = ? \
             WHERE email = ? \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(update.name)
        .bind(update.password_hash)
        .bind(update.security_question)
        .bind(update.security_answer_hash)
        .bind(update.status)
        .bind(Utc::now())
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Applies a partial update to the user with the given id.
    ///
    /// # Returns
    /// The updated User, or `None` if no row matched
    pub async fn update_user_by_id(
        &self,
        id: &str,
        update: UpdateUserRecord,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
             name = COALESCE(?, name), \
             password_hash = COALESCE(?, password_hash), \
             security_question = COALESCE(?, security_question), \
             security_answer_hash = COALESCE(?, security_answer_hash), \
             status = COALESCE(?, status), \
             updated_at = ? \
             WHERE id = ? \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(update.name)
        .bind(update.password_hash)
        .bind(update.security_question)
        .bind(update.security_answer_hash)
        .bind(update.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Deletes the user with the given id. Administrative operation; the
    /// auth flow never removes records.
    ///
    /// # Returns
    /// `true` if a row was deleted
    pub async fn delete_user(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
