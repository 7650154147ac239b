//! Repository for the `projects` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{Project, ProjectData, ProjectFilter, ProjectListItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, category_id, year, status, excerpt, content, location, \
                        area_sqm, cover_image_path, gallery, created_by, updated_by, \
                        created_at, updated_at";

/// Columns for the joined listing query.
const LIST_COLUMNS: &str = "p.id, p.title, p.slug, p.category_id, c.name AS category_name, \
                             p.year, p.status, p.excerpt, p.location, p.cover_image_path, \
                             cb.full_name AS created_by_name, ub.full_name AS updated_by_name, \
                             p.created_at, p.updated_at";

/// Shared filter clause for the listing and count queries. `$1` is the
/// ILIKE pattern (or NULL), `$2` the status, `$3` the category id.
const FILTER_CLAUSE: &str = "($1::text IS NULL
                   OR p.title ILIKE $1 OR p.excerpt ILIKE $1 OR p.slug ILIKE $1)
              AND ($2::text IS NULL OR p.status = $2)
              AND ($3::bigint IS NULL OR p.category_id = $3)";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project row with the full field set, returning it.
    ///
    /// Used by both the draft-create and the commit-create paths; the
    /// caller decides the status and validation level.
    pub async fn create(
        pool: &PgPool,
        data: &ProjectData,
        created_by: Option<DbId>,
        updated_by: Option<DbId>,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, slug, category_id, year, status, excerpt, content,
                                   location, area_sqm, cover_image_path, gallery,
                                   created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&data.title)
            .bind(&data.slug)
            .bind(data.category_id)
            .bind(data.year)
            .bind(&data.status)
            .bind(&data.excerpt)
            .bind(&data.content)
            .bind(&data.location)
            .bind(data.area_sqm)
            .bind(&data.cover_image_path)
            .bind(&data.gallery)
            .bind(created_by)
            .bind(updated_by)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a project row with the full field set.
    ///
    /// Both autosave and committed saves replace the whole row with the
    /// session's current values (last write wins), so this is a full
    /// overwrite rather than a per-field patch. `created_by` is only
    /// touched when an author override was resolved.
    pub async fn overwrite(
        pool: &PgPool,
        id: DbId,
        data: &ProjectData,
        updated_by: Option<DbId>,
        created_by_override: Option<DbId>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = $2,
                slug = $3,
                category_id = $4,
                year = $5,
                status = $6,
                excerpt = $7,
                content = $8,
                location = $9,
                area_sqm = $10,
                cover_image_path = $11,
                gallery = $12,
                updated_by = $13,
                created_by = COALESCE($14, created_by)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.slug)
            .bind(data.category_id)
            .bind(data.year)
            .bind(&data.status)
            .bind(&data.excerpt)
            .bind(&data.content)
            .bind(&data.location)
            .bind(data.area_sqm)
            .bind(&data.cover_image_path)
            .bind(&data.gallery)
            .bind(updated_by)
            .bind(created_by_override)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editable text fields of a draft with the session's
    /// current values.
    ///
    /// The image columns (`cover_image_path`, `gallery`) are deliberately
    /// left untouched: uploads record them through [`ProjectRepo::set_images`],
    /// and a concurrent autosave must not clobber them.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        data: &ProjectData,
        updated_by: Option<DbId>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = $2,
                slug = $3,
                category_id = $4,
                year = $5,
                status = $6,
                excerpt = $7,
                content = $8,
                location = $9,
                area_sqm = $10,
                updated_by = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.slug)
            .bind(data.category_id)
            .bind(data.year)
            .bind(&data.status)
            .bind(&data.excerpt)
            .bind(&data.content)
            .bind(&data.location)
            .bind(data.area_sqm)
            .bind(updated_by)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a published project by slug, for the public site.
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM projects WHERE slug = $1 AND status = 'published'");
        sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Filtered, paginated admin listing with resolved category and
    /// author names, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectListItem>, sqlx::Error> {
        let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));
        let query = format!(
            "SELECT {LIST_COLUMNS}
             FROM projects p
             LEFT JOIN project_categories c ON c.id = p.category_id
             LEFT JOIN users cb ON cb.id = p.created_by
             LEFT JOIN users ub ON ub.id = p.updated_by
             WHERE {FILTER_CLAUSE}
             ORDER BY p.created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ProjectListItem>(&query)
            .bind(&pattern)
            .bind(&filter.status)
            .bind(filter.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total row count for the same filters as [`ProjectRepo::list`].
    pub async fn count(pool: &PgPool, filter: &ProjectFilter) -> Result<i64, sqlx::Error> {
        let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));
        let query = format!("SELECT COUNT(*) FROM projects p WHERE {FILTER_CLAUSE}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(&pattern)
            .bind(&filter.status)
            .bind(filter.category_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Record cover/gallery object paths after an upload.
    pub async fn set_images(
        pool: &PgPool,
        id: DbId,
        cover_image_path: Option<&str>,
        gallery: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET cover_image_path = COALESCE($2, cover_image_path), gallery = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(cover_image_path)
        .bind(gallery)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project by ID. Returns `true` if a row was
    /// removed. Revisions go with it via ON DELETE CASCADE.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
