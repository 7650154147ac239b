//! Document version entity model and DTOs.
//!
//! Versions are append-only snapshots; each points at its own file object.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `document_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentVersion {
    pub id: DbId,
    pub document_id: DbId,
    pub version_label: String,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentVersion {
    pub document_id: DbId,
    pub version_label: String,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub created_by: Option<DbId>,
}

/// Metadata patch for an existing version. File contents are immutable;
/// only the labels can change. An empty `description` clears the column.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocumentVersion {
    pub title: Option<String>,
    pub version_label: Option<String>,
    pub description: Option<String>,
}

impl UpdateDocumentVersion {
    /// Whether the patch would change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.version_label.is_none() && self.description.is_none()
    }
}
