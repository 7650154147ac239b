//! Repository for the `document_categories` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_category::DocumentCategory;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, sort_order, created_at, updated_at";

/// Provides CRUD operations for document categories.
pub struct DocumentCategoryRepo;

impl DocumentCategoryRepo {
    /// List all categories in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<DocumentCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_categories
             ORDER BY sort_order ASC NULLS LAST, name ASC"
        );
        sqlx::query_as::<_, DocumentCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DocumentCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_categories WHERE id = $1");
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new category at the given sort position.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        sort_order: Option<i32>,
    ) -> Result<DocumentCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_categories (name, sort_order)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentCategory>(&query)
            .bind(name)
            .bind(sort_order)
            .fetch_one(pool)
            .await
    }
}
