//! Handlers for the `/projects` resource.
//!
//! Two write paths exist, with different validation levels:
//!
//! - **Draft path** (`/projects/draft`, and the WebSocket editor): forces
//!   `status = "draft"`, skips the category requirement, never appends a
//!   revision. The editor must never be blocked from typing by
//!   validation.
//! - **Commit path** (`POST /projects`, `PUT /projects/{id}`): fully
//!   validated, resolves author overrides, and appends an audit revision.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::documents::{project_cover_path, project_gallery_path};
use portal_core::editor::status as project_status;
use portal_core::error::CoreError;
use portal_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use portal_core::revisions::{actions, RevisionPayload};
use portal_core::roles::can_manage_content;
use portal_core::slug::validate_slug;
use portal_core::types::DbId;
use serde::Deserialize;
use sqlx::PgPool;

use portal_db::models::project::{Project, ProjectData, ProjectFilter, ProjectPage};
use portal_db::models::project_revision::{CreateProjectRevision, ProjectRevision};
use portal_db::repositories::{ProjectRepo, ProjectRevisionRepo, RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for the admin project listing.
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Case-insensitive substring match on title, excerpt, or slug.
    pub q: Option<String>,
    pub status: Option<String>,
    pub category: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for the commit path. The author override is only honored
/// when the requested user may manage content.
#[derive(Debug, Deserialize)]
pub struct CommitProjectRequest {
    #[serde(flatten)]
    pub data: ProjectData,
    pub created_by_override: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a project exists, returning the full row.
async fn ensure_project_exists(pool: &PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Resolve the effective author for a committed write.
///
/// A requested override is honored only if that user exists and may
/// manage content; anything else falls back to the acting user with a
/// warning, mirroring how an unauthorized override is a data-entry slip,
/// not an error worth failing the save for.
async fn resolve_author(
    pool: &PgPool,
    requested: Option<DbId>,
    fallback: DbId,
) -> AppResult<DbId> {
    let Some(requested_id) = requested else {
        return Ok(fallback);
    };

    let Some(user) = UserRepo::find_by_id(pool, requested_id).await? else {
        tracing::warn!(requested_id, "Author override rejected (no such user), keeping fallback");
        return Ok(fallback);
    };

    let role = RoleRepo::resolve_name(pool, user.role_id).await?;
    if !can_manage_content(&role) {
        tracing::warn!(requested_id, %role, "Author override rejected (role), keeping fallback");
        return Ok(fallback);
    }

    Ok(requested_id)
}

/// Commit-path validation: required fields, slug shape, and the
/// category-before-publish rule.
fn validate_commit(data: &ProjectData) -> AppResult<()> {
    if data.title.trim().is_empty() || data.slug.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title and slug are required".into(),
        )));
    }
    validate_slug(&data.slug)?;

    if ![
        project_status::DRAFT,
        project_status::PUBLISHED,
        project_status::ARCHIVED,
    ]
    .contains(&data.status.as_str())
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown status '{}'",
            data.status
        ))));
    }

    if data.status != project_status::DRAFT && data.category_id.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "A category is required to publish".into(),
        )));
    }
    Ok(())
}

/// Insert a draft row. Shared by the HTTP draft endpoint and the
/// WebSocket editor; forces `status = "draft"` and skips the category
/// rule, but still requires a non-empty title and slug.
pub async fn insert_draft_row(
    pool: &PgPool,
    data: &ProjectData,
    user_id: Option<DbId>,
) -> AppResult<Project> {
    if data.title.trim().is_empty() || data.slug.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title and slug are required".into(),
        )));
    }

    let mut data = data.clone();
    data.status = project_status::DRAFT.to_string();
    // Images are attached through the upload endpoint, never by a draft.
    data.cover_image_path = None;
    data.gallery = Vec::new();

    let project = ProjectRepo::create(pool, &data, user_id, user_id).await?;
    Ok(project)
}

/// Overwrite a draft row with the session's current field values.
/// No revision is appended; a missing status falls back to `draft`.
pub async fn save_draft_row(
    pool: &PgPool,
    id: DbId,
    data: &ProjectData,
    user_id: Option<DbId>,
) -> AppResult<Project> {
    let mut data = data.clone();
    if data.status.trim().is_empty() {
        data.status = project_status::DRAFT.to_string();
    }

    ProjectRepo::update_fields(pool, id, &data, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// The committed write: validate, resolve the author, persist, and
/// append a revision. Shared by the HTTP commit endpoints and the
/// WebSocket editor's commit message.
pub async fn apply_commit(
    pool: &PgPool,
    id: Option<DbId>,
    request: &CommitProjectRequest,
    acting_user: DbId,
) -> AppResult<Project> {
    validate_commit(&request.data)?;

    let author = resolve_author(pool, request.created_by_override, acting_user).await?;

    let (project, action) = match id {
        Some(id) => {
            let project = ProjectRepo::overwrite(
                pool,
                id,
                &request.data,
                Some(acting_user),
                Some(author),
            )
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            }))?;
            (project, actions::UPDATE)
        }
        None => {
            let project =
                ProjectRepo::create(pool, &request.data, Some(author), Some(acting_user)).await?;
            (project, actions::CREATE)
        }
    };

    let payload = RevisionPayload {
        title: project.title.clone(),
        status: project.status.clone(),
        category_id: project.category_id,
        slug: project.slug.clone(),
    };
    ProjectRevisionRepo::create(
        pool,
        &CreateProjectRevision {
            project_id: project.id,
            user_id: Some(acting_user),
            action: action.to_string(),
            payload: payload.to_json(),
        },
    )
    .await?;

    Ok(project)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
///
/// Filtered, paginated listing with resolved category and author names.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListProjectsQuery>,
) -> AppResult<Json<ProjectPage>> {
    let filter = ProjectFilter {
        search: params.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
        status: params.status.filter(|s| !s.is_empty()),
        category_id: params.category,
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let items = ProjectRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = ProjectRepo::count(&state.pool, &filter).await?;
    Ok(Json(ProjectPage { items, total }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ensure_project_exists(&state.pool, id).await?;
    Ok(Json(project))
}

/// GET /api/v1/projects/by-slug/{slug}
///
/// Published projects only; consumed by the public site, so no auth.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: 0,
        }))?;
    Ok(Json(project))
}

/// POST /api/v1/projects/draft
pub async fn create_draft(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Json(data): Json<ProjectData>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = insert_draft_row(&state.pool, &data, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/v1/projects/draft/{id}
pub async fn update_draft(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(data): Json<ProjectData>,
) -> AppResult<Json<Project>> {
    let project = save_draft_row(&state.pool, id, &data, Some(user.user_id)).await?;
    Ok(Json(project))
}

/// POST /api/v1/projects
///
/// Commit-create: validated, appends a `create` revision.
pub async fn create(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<CommitProjectRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = apply_commit(&state.pool, None, &input, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/v1/projects/{id}
///
/// Commit-update: validated, appends an `update` revision.
pub async fn update(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CommitProjectRequest>,
) -> AppResult<Json<Project>> {
    let project = apply_commit(&state.pool, Some(id), &input, user.user_id).await?;
    Ok(Json(project))
}

/// POST /api/v1/projects/{id}/images (multipart)
///
/// Upload a cover image (`cover` field) and/or gallery images (`gallery`
/// fields, repeatable). New gallery images are appended to the existing
/// list in upload order.
pub async fn upload_images(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<Project>> {
    let project = ensure_project_exists(&state.pool, id).await?;

    let millis = chrono::Utc::now().timestamp_millis();
    let mut cover: Option<String> = None;
    let mut gallery = project.gallery.clone();
    let mut gallery_index = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            continue;
        }

        match name.as_str() {
            "cover" => {
                let path = project_cover_path(id, millis, &file_name);
                state
                    .object_store
                    .put(&path, bytes.to_vec(), &content_type, false)
                    .await?;
                cover = Some(path);
            }
            "gallery" => {
                let path = project_gallery_path(id, millis, gallery_index, &file_name);
                gallery_index += 1;
                state
                    .object_store
                    .put(&path, bytes.to_vec(), &content_type, false)
                    .await?;
                gallery.push(path);
            }
            _ => {}
        }
    }

    ProjectRepo::set_images(&state.pool, id, cover.as_deref(), &gallery).await?;
    let project = ensure_project_exists(&state.pool, id).await?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Remove the row and its storage objects (cover + gallery). Revisions
/// cascade with the row.
pub async fn delete(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let project = ensure_project_exists(&state.pool, id).await?;

    let mut paths: Vec<String> = project.gallery.clone();
    if let Some(cover) = &project.cover_image_path {
        paths.push(cover.clone());
    }
    if !paths.is_empty() {
        state.object_store.delete(&paths).await?;
    }

    ProjectRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/revisions
///
/// Audit trail for a project, newest first.
pub async fn revisions(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectRevision>>>> {
    ensure_project_exists(&state.pool, id).await?;
    let revisions = ProjectRevisionRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: revisions }))
}
