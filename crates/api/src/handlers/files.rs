//! Signed-URL verification route for the local storage backend.
//!
//! `GET /files/local/{*path}?exp=..&sig=..` carries its own capability
//! (the HMAC signature), so there is no auth extractor here -- the URL
//! was issued by the preview endpoint after the visibility check.
//! S3-backed deployments never hit this route.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use portal_storage::ObjectStore;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters carried by a locally signed URL.
#[derive(Debug, Deserialize)]
pub struct SignedFileQuery {
    pub exp: i64,
    pub sig: String,
    #[serde(default)]
    pub download: bool,
}

/// GET /api/v1/files/local/{*path}
pub async fn serve_local(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<SignedFileQuery>,
) -> AppResult<Response> {
    let Some(local) = &state.local_store else {
        return Err(AppError::BadRequest(
            "Local file serving is not enabled on this deployment".into(),
        ));
    };

    local.verify(&path, params.exp, &params.sig)?;

    let bytes = local.get(&path).await?;

    let file_name = path.rsplit('/').next().unwrap_or("file").to_string();
    let disposition = if params.download {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        "inline".to_string()
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&path).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Content type from the file extension; the upload allowlist keeps this
/// set small.
fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
