//! The signed-URL issuer: `/documents/preview`.
//!
//! Resolves a storage path back to its document (head file or any older
//! version), applies the visibility rule, and only then asks the object
//! store for a time-limited URL. The URL itself is the capability; the
//! store backend decides its shape (S3 presigned GET or a local
//! HMAC-signed route).

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use portal_core::documents::can_read;
use portal_core::error::CoreError;
use portal_core::types::Timestamp;
use portal_storage::Disposition;
use serde::{Deserialize, Serialize};

use portal_db::repositories::{DocumentRepo, DocumentVersionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// Query parameters for `GET /documents/preview`.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Object-store path of the requested file.
    pub path: String,
    /// `true` forces a download disposition with the stored file name.
    #[serde(default)]
    pub download: bool,
}

/// Response body: the capability URL and when it stops working.
#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_at: Timestamp,
}

/// GET /api/v1/documents/preview?path=...&download=...
pub async fn preview(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<PreviewQuery>,
) -> AppResult<Json<SignedUrlResponse>> {
    let path = params.path.trim();
    if path.is_empty() {
        return Err(AppError::BadRequest("Missing file path".into()));
    }

    // Resolve the path to its owning document: head file first, then the
    // version history (older versions keep their own files).
    let (visibility, file_name) = match DocumentRepo::find_by_file_path(&state.pool, path).await? {
        Some(document) => (document.visibility, document.file_name),
        None => {
            let version = DocumentVersionRepo::find_by_file_path(&state.pool, path)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::NotFound {
                        entity: "Document",
                        id: 0,
                    })
                })?;
            let document = DocumentRepo::find_by_id(&state.pool, version.document_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Document",
                    id: version.document_id,
                }))?;
            (document.visibility, version.file_name)
        }
    };

    if !can_read(&visibility, &user.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this document".into(),
        )));
    }

    let disposition = if params.download {
        Disposition::Attachment { file_name }
    } else {
        Disposition::Inline
    };

    let ttl = state.config.signed_url_ttl();
    let url = state.object_store.signed_url(path, ttl, &disposition).await?;
    let expires_at =
        Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());

    Ok(Json(SignedUrlResponse { url, expires_at }))
}
