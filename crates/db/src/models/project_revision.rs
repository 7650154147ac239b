//! Project revision entity model and DTOs.
//!
//! Revisions are immutable once created (no updated_at).

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `project_revisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectRevision {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending a revision entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRevision {
    pub project_id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub payload: serde_json::Value,
}
