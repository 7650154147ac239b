//! Handlers for the `/documents` resource.
//!
//! Every uploaded file becomes a version row; the document row always
//! mirrors the newest version's file so listing stays a single query.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::documents::{
    document_path, next_version_label, validate_upload, visibility,
};
use portal_core::error::CoreError;
use portal_core::roles::can_manage_content;
use portal_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use portal_db::models::document::{
    CreateDocument, Document, DocumentListItem, UpdateDocumentHead,
};
use portal_db::models::document_version::{
    CreateDocumentVersion, DocumentVersion, UpdateDocumentVersion,
};
use portal_db::repositories::{DocumentRepo, DocumentVersionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the portal document listing.
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub category: Option<DbId>,
}

/// Response for `GET /documents/{id}`: the head row plus its history.
#[derive(Debug, Serialize)]
pub struct DocumentWithVersions {
    pub document: Document,
    pub versions: Vec<DocumentVersion>,
}

/// One file pulled out of a multipart payload.
struct UploadedFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Text fields + file collected from an upload form.
#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    category_id: Option<DbId>,
    visibility: Option<String>,
    version_label: Option<String>,
    file: Option<UploadedFile>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a document exists, returning the full row.
async fn ensure_document_exists(pool: &PgPool, id: DbId) -> AppResult<Document> {
    DocumentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))
}

/// Collect the known fields from a multipart upload form.
async fn read_upload_form(multipart: &mut Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        file_name,
                        mime_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?;
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match other {
                    "title" => form.title = Some(value),
                    "description" => form.description = Some(value),
                    "category_id" => {
                        form.category_id = Some(value.parse().map_err(|_| {
                            AppError::BadRequest("category_id must be an integer".into())
                        })?)
                    }
                    "visibility" => form.visibility = Some(value),
                    "version_label" => form.version_label = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

/// Store an uploaded file under a fresh `documents/` path.
async fn store_document_file(state: &AppState, file: &UploadedFile) -> AppResult<String> {
    validate_upload(&file.file_name, &file.mime_type)?;

    let millis = chrono::Utc::now().timestamp_millis();
    let nonce = uuid::Uuid::new_v4().simple().to_string()[..6].to_string();
    let path = document_path(millis, &nonce, &file.file_name);

    state
        .object_store
        .put(&path, file.bytes.clone(), &file.mime_type, false)
        .await?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/documents
///
/// Portal listing. Viewers only see `authenticated` documents; content
/// managers also see `admin_only`.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsQuery>,
) -> AppResult<Json<DataResponse<Vec<DocumentListItem>>>> {
    let include_admin_only = can_manage_content(&user.role);
    let documents =
        DocumentRepo::list(&state.pool, include_admin_only, params.category).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/documents/{id}
///
/// The document and its version history, newest version first.
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DocumentWithVersions>> {
    let document = ensure_document_exists(&state.pool, id).await?;
    if !portal_core::documents::can_read(&document.visibility, &user.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this document".into(),
        )));
    }

    let versions = DocumentVersionRepo::list_by_document(&state.pool, id).await?;
    Ok(Json(DocumentWithVersions { document, versions }))
}

/// POST /api/v1/documents (multipart)
///
/// Upload a new document: store the file, insert the document row, and
/// record the initial `v1` version.
pub async fn upload(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Document>)> {
    let form = read_upload_form(&mut multipart).await?;

    let title = form
        .title
        .ok_or_else(|| AppError::Core(CoreError::Validation("Title is required".into())))?;
    let file = form
        .file
        .ok_or_else(|| AppError::Core(CoreError::Validation("No file uploaded".into())))?;

    let doc_visibility = form
        .visibility
        .unwrap_or_else(|| visibility::AUTHENTICATED.to_string());
    if doc_visibility != visibility::AUTHENTICATED && doc_visibility != visibility::ADMIN_ONLY {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown visibility '{doc_visibility}'"
        ))));
    }

    let path = store_document_file(&state, &file).await?;

    let document = DocumentRepo::create(
        &state.pool,
        &CreateDocument {
            title: title.clone(),
            description: form.description,
            category_id: form.category_id,
            file_path: path.clone(),
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
            visibility: doc_visibility,
            created_by: Some(user.user_id),
        },
    )
    .await?;

    DocumentVersionRepo::create(
        &state.pool,
        &CreateDocumentVersion {
            document_id: document.id,
            version_label: "v1".to_string(),
            title,
            description: None,
            file_path: path,
            file_name: file.file_name,
            mime_type: file.mime_type,
            created_by: Some(user.user_id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// POST /api/v1/documents/{id}/versions (multipart)
///
/// Upload a new version. Without an explicit label the next `v{n}` is
/// used; the head row is re-pointed at the new file. Older files are
/// kept for traceability.
pub async fn upload_version(
    RequireEditor(user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DocumentVersion>)> {
    let existing = ensure_document_exists(&state.pool, id).await?;

    let form = read_upload_form(&mut multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::Core(CoreError::Validation("No file uploaded".into())))?;

    let count = DocumentVersionRepo::count_for_document(&state.pool, id).await?;
    let label = next_version_label(form.version_label.as_deref(), count);
    let title = form.title.unwrap_or_else(|| existing.title.clone());

    let path = store_document_file(&state, &file).await?;

    let version = DocumentVersionRepo::create(
        &state.pool,
        &CreateDocumentVersion {
            document_id: id,
            version_label: label,
            title: title.clone(),
            description: form.description,
            file_path: path.clone(),
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
            created_by: Some(user.user_id),
        },
    )
    .await?;

    DocumentRepo::update_head(
        &state.pool,
        id,
        &UpdateDocumentHead {
            title,
            file_path: path,
            file_name: file.file_name,
            mime_type: file.mime_type,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(version)))
}

/// PUT /api/v1/documents/versions/{id}
///
/// Patch version metadata (title, label, description). An empty patch is
/// a no-op returning the current row.
pub async fn update_version(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentVersion>,
) -> AppResult<Json<DocumentVersion>> {
    if input.is_empty() {
        let version = DocumentVersionRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "DocumentVersion",
                id,
            }))?;
        return Ok(Json(version));
    }

    let version = DocumentVersionRepo::update_metadata(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DocumentVersion",
            id,
        }))?;
    Ok(Json(version))
}

/// DELETE /api/v1/documents/{id}
///
/// Remove the head file, every version file, and the rows (versions
/// cascade with the document).
pub async fn delete(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let document = ensure_document_exists(&state.pool, id).await?;

    let mut paths = DocumentVersionRepo::file_paths_for_document(&state.pool, id).await?;
    if !paths.contains(&document.file_path) {
        paths.push(document.file_path.clone());
    }
    if !paths.is_empty() {
        state.object_store.delete(&paths).await?;
    }

    DocumentRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
