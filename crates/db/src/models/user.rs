//! User entity model and DTOs.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password and invite-token hashes -- NEVER serialize this
/// to API responses directly. Use [`UserResponse`] for external-facing
/// output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    /// `None` until an invited user accepts and sets a password.
    pub password_hash: Option<String>,
    pub role_id: DbId,
    pub avatar_path: Option<String>,
    pub is_active: bool,
    pub invited_at: Option<Timestamp>,
    pub invite_token_hash: Option<String>,
    pub last_sign_in_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no credential material).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    /// Resolved role name (e.g. `"editor"`).
    pub role: String,
    pub role_id: DbId,
    pub avatar_path: Option<String>,
    pub is_active: bool,
    pub invited_at: Option<Timestamp>,
    pub last_sign_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: Option<String>,
    /// `None` for invited users; they set a password on acceptance.
    pub password_hash: Option<String>,
    pub role_id: DbId,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}
