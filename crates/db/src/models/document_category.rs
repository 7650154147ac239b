//! Document category entity model and DTOs.

use portal_core::categories::Ranked;
use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `document_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentCategory {
    pub id: DbId,
    pub name: String,
    pub sort_order: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ranked for DocumentCategory {
    fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// DTO for creating a new document category.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentCategory {
    pub name: String,
}
