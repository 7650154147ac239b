//! Repository for the `users` table.

use portal_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, full_name, password_hash, role_id, avatar_path, is_active, \
                        invited_at, invite_token_hash, last_sign_in_at, failed_login_count, \
                        locked_until, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, full_name, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by invite token hash. Only matches unconsumed invites.
    pub async fn find_by_invite_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE invite_token_hash = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// List all users with resolved role names, newest first.
    pub async fn list_with_roles(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
        sqlx::query_as::<_, UserResponse>(
            "SELECT u.id, u.email, u.full_name, r.name AS role, u.role_id, u.avatar_path,
                    u.is_active, u.invited_at, u.last_sign_in_at, u.created_at
             FROM users u
             JOIN roles r ON r.id = u.role_id
             ORDER BY u.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                role_id = COALESCE($4, role_id),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.role_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the display name. Returns `true` if the row was updated.
    pub async fn set_full_name(
        pool: &PgPool,
        id: DbId,
        full_name: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET full_name = $2 WHERE id = $1")
            .bind(id)
            .bind(full_name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role. Returns `true` if the row was updated.
    pub async fn set_role(pool: &PgPool, id: DbId, role_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role_id = $2 WHERE id = $1")
            .bind(id)
            .bind(role_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the avatar object path. Returns `true` if the row was updated.
    pub async fn set_avatar_path(
        pool: &PgPool,
        id: DbId,
        avatar_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET avatar_path = $2 WHERE id = $1")
            .bind(id)
            .bind(avatar_path)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record an issued invite: stores the token hash and invite time.
    pub async fn record_invite(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET invite_token_hash = $2, invited_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Consume an invite: set the password and clear the token so the
    /// invite link cannot be replayed.
    pub async fn accept_invite(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, invite_token_hash = NULL WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count`, clear
    /// `locked_until`, and set `last_sign_in_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_sign_in_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
