//! Refresh-token session entity model and DTOs.

use portal_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// A session row from the `sessions` table. One row per issued refresh
/// token; rotation revokes the old row and inserts a new one.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug, Deserialize)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
