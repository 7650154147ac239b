//! Repository for the append-only `project_revisions` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::project_revision::{CreateProjectRevision, ProjectRevision};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, user_id, action, payload, created_at";

/// Provides append and read operations for project revisions.
pub struct ProjectRevisionRepo;

impl ProjectRevisionRepo {
    /// Append a revision entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProjectRevision,
    ) -> Result<ProjectRevision, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_revisions (project_id, user_id, action, payload)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRevision>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(&input.action)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    /// List revisions for a project, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectRevision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_revisions
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectRevision>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
