//! Repository for the `documents` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document, DocumentListItem, UpdateDocumentHead};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, category_id, file_path, file_name, mime_type, \
                        visibility, published_at, created_by, created_at, updated_at";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (title, description, category_id, file_path, file_name,
                                    mime_type, visibility, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.file_path)
            .bind(&input.file_name)
            .bind(&input.mime_type)
            .bind(&input.visibility)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a document by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the document whose head file is stored at `file_path`.
    pub async fn find_by_file_path(
        pool: &PgPool,
        file_path: &str,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE file_path = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(file_path)
            .fetch_optional(pool)
            .await
    }

    /// Portal listing with resolved category names, newest publication
    /// first. With `include_admin_only = false` only `authenticated`
    /// documents are returned.
    pub async fn list(
        pool: &PgPool,
        include_admin_only: bool,
        category_id: Option<DbId>,
    ) -> Result<Vec<DocumentListItem>, sqlx::Error> {
        sqlx::query_as::<_, DocumentListItem>(
            "SELECT d.id, d.title, d.description, d.category_id, c.name AS category_name,
                    d.file_path, d.file_name, d.mime_type, d.visibility, d.published_at,
                    d.created_at
             FROM documents d
             LEFT JOIN document_categories c ON c.id = d.category_id
             WHERE ($1 OR d.visibility = 'authenticated')
               AND ($2::bigint IS NULL OR d.category_id = $2)
             ORDER BY d.published_at DESC",
        )
        .bind(include_admin_only)
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    /// Point the head row at a newly uploaded version's file.
    pub async fn update_head(
        pool: &PgPool,
        id: DbId,
        head: &UpdateDocumentHead,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                title = $2,
                file_path = $3,
                file_name = $4,
                mime_type = $5,
                published_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(&head.title)
            .bind(&head.file_path)
            .bind(&head.file_name)
            .bind(&head.mime_type)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a document. Versions go with it via
    /// ON DELETE CASCADE. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
