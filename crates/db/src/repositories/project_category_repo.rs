//! Repository for the `project_categories` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::project_category::{CreateProjectCategory, ProjectCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, sort_order, created_at, updated_at";

/// Provides CRUD operations for project categories.
pub struct ProjectCategoryRepo;

impl ProjectCategoryRepo {
    /// List all categories in display order: sort_order ascending with
    /// unranked entries last, then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProjectCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_categories
             ORDER BY sort_order ASC NULLS LAST, name ASC"
        );
        sqlx::query_as::<_, ProjectCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_categories WHERE id = $1");
        sqlx::query_as::<_, ProjectCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new category, returning the created row. The caller
    /// derives the slug and resolves the default sort position.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProjectCategory,
        slug: &str,
        sort_order: Option<i32>,
    ) -> Result<ProjectCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_categories (name, slug, sort_order)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectCategory>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(sort_order)
            .fetch_one(pool)
            .await
    }

    /// Set (or clear) the sort position of one category; no other field
    /// is touched. Returns `None` if the id does not exist.
    pub async fn set_sort_order(
        pool: &PgPool,
        id: DbId,
        sort_order: Option<i32>,
    ) -> Result<Option<ProjectCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE project_categories SET sort_order = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectCategory>(&query)
            .bind(id)
            .bind(sort_order)
            .fetch_optional(pool)
            .await
    }
}
