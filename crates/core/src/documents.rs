//! Document upload rules: file-type allowlist, visibility, version labels,
//! and object-store path construction.

use crate::error::CoreError;
use crate::roles::can_manage_content;
use crate::types::DbId;

/// Document visibility values, matching the CHECK constraint on `documents`.
pub mod visibility {
    pub const AUTHENTICATED: &str = "authenticated";
    pub const ADMIN_ONLY: &str = "admin_only";
}

/// File extensions accepted for document uploads.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "xlsx", "pptx", "txt", "csv", "jpg", "jpeg", "png",
];

/// MIME types accepted for document uploads.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    "image/jpeg",
    "image/png",
];

/// Lowercased extension of a file name, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Reject files outside the upload allowlist (both extension and MIME
/// type must match).
pub fn validate_upload(file_name: &str, mime_type: &str) -> Result<(), CoreError> {
    let ext_ok = file_extension(file_name)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    if !ext_ok || !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

/// Whether a role may read a document with the given visibility.
pub fn can_read(visibility_value: &str, role: &str) -> bool {
    match visibility_value {
        visibility::ADMIN_ONLY => can_manage_content(role),
        // Any authenticated user; unknown values stay restricted.
        visibility::AUTHENTICATED => true,
        _ => can_manage_content(role),
    }
}

/// Version label for a new upload: an explicit label wins, otherwise
/// `v{n+1}` where `n` is the number of existing versions.
pub fn next_version_label(explicit: Option<&str>, existing_count: i64) -> String {
    match explicit {
        Some(label) if !label.trim().is_empty() => label.trim().to_string(),
        _ => format!("v{}", existing_count + 1),
    }
}

// ---------------------------------------------------------------------------
// Object-store path construction
// ---------------------------------------------------------------------------

/// Storage path for a document file: `documents/{millis}-{nonce}.{ext}`.
///
/// The nonce keeps concurrent uploads within the same millisecond from
/// colliding.
pub fn document_path(unix_millis: i64, nonce: &str, file_name: &str) -> String {
    let ext = file_extension(file_name).unwrap_or_else(|| "bin".to_string());
    format!("documents/{unix_millis}-{nonce}.{ext}")
}

/// Storage path for a project cover image.
pub fn project_cover_path(project_id: DbId, unix_millis: i64, file_name: &str) -> String {
    let ext = file_extension(file_name).unwrap_or_else(|| "bin".to_string());
    format!("projects/{project_id}/cover-{unix_millis}.{ext}")
}

/// Storage path for one project gallery image.
pub fn project_gallery_path(
    project_id: DbId,
    unix_millis: i64,
    index: usize,
    file_name: &str,
) -> String {
    let ext = file_extension(file_name).unwrap_or_else(|| "bin".to_string());
    format!("projects/{project_id}/gallery/{unix_millis}-{index}.{ext}")
}

/// Extensions that browsers report for anonymous blobs; never trusted.
const UNSAFE_AVATAR_EXTENSIONS: &[&str] = &["blob", "octet-stream"];

/// Storage path for a user avatar. Always `avatars/{user_id}.{ext}` so a
/// re-upload overwrites the previous file. Untrusted extensions fall back
/// to `png`.
pub fn avatar_path(user_id: DbId, file_name: &str, mime_type: &str) -> String {
    let candidate = file_extension(file_name)
        .or_else(|| {
            mime_type
                .rsplit_once('/')
                .map(|(_, sub)| sub.to_lowercase())
        })
        .unwrap_or_else(|| "png".to_string());

    let ext = if UNSAFE_AVATAR_EXTENSIONS.contains(&candidate.as_str()) {
        "png".to_string()
    } else {
        candidate
    };

    format!("avatars/{user_id}.{ext}")
}

/// Content type recorded for an avatar upload; anything that is not an
/// image is stored as `image/png`.
pub fn avatar_content_type(mime_type: &str) -> String {
    let lowered = mime_type.to_lowercase();
    if lowered.starts_with("image/") {
        lowered
    } else {
        "image/png".to_string()
    }
}
