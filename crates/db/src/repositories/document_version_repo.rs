//! Repository for the append-only `document_versions` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_version::{
    CreateDocumentVersion, DocumentVersion, UpdateDocumentVersion,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, document_id, version_label, title, description, file_path, \
                        file_name, mime_type, created_by, created_at";

/// Provides append and read operations for document versions.
pub struct DocumentVersionRepo;

impl DocumentVersionRepo {
    /// Append a new version snapshot.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDocumentVersion,
    ) -> Result<DocumentVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_versions (document_id, version_label, title, description,
                                            file_path, file_name, mime_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(input.document_id)
            .bind(&input.version_label)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.file_path)
            .bind(&input.file_name)
            .bind(&input.mime_type)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a version by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DocumentVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_versions WHERE id = $1");
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the version stored at `file_path` (for preview requests
    /// against an older version's file).
    pub async fn find_by_file_path(
        pool: &PgPool,
        file_path: &str,
    ) -> Result<Option<DocumentVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_versions WHERE file_path = $1");
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(file_path)
            .fetch_optional(pool)
            .await
    }

    /// List all versions of a document, newest first.
    pub async fn list_by_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<DocumentVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_versions
             WHERE document_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// All file paths referenced by a document's versions, for storage
    /// cleanup on delete.
    pub async fn file_paths_for_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT file_path FROM document_versions WHERE document_id = $1")
                .bind(document_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(p,)| p).collect())
    }

    /// Number of versions a document has (drives default version labels).
    pub async fn count_for_document(pool: &PgPool, document_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM document_versions WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Patch version metadata. Title and label keep their value when not
    /// provided; a provided empty description clears the column.
    pub async fn update_metadata(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocumentVersion,
    ) -> Result<Option<DocumentVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE document_versions SET
                title = COALESCE($2, title),
                version_label = COALESCE($3, version_label),
                description = CASE WHEN $4::text IS NOT NULL
                                   THEN NULLIF($4, '')
                                   ELSE description END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.version_label)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }
}
