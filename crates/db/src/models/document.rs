//! Document entity model and DTOs.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `documents` table. The file columns always mirror the
/// newest version.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub visibility: String,
    pub published_at: Timestamp,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub visibility: String,
    pub created_by: Option<DbId>,
}

/// Head-row update applied when a new version is uploaded.
#[derive(Debug, Clone)]
pub struct UpdateDocumentHead {
    pub title: String,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
}

/// A document listing row with its resolved category name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentListItem {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub visibility: String,
    pub published_at: Timestamp,
    pub created_at: Timestamp,
}
