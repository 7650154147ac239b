//! Route definitions for documents and document categories.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{document_categories, documents, preview};
use crate::state::AppState;

/// Document routes.
///
/// ```text
/// GET  /documents                   -> portal listing (visibility-filtered)
/// POST /documents                   -> upload (multipart)
/// GET  /documents/preview           -> signed URL issuer
/// GET  /documents/{id}              -> document + versions
/// DELETE /documents/{id}            -> delete rows + storage objects
/// POST /documents/{id}/versions     -> upload new version (multipart)
/// PUT  /documents/versions/{id}     -> update version metadata
///
/// GET  /document-categories         -> display-ordered list
/// POST /document-categories         -> create at end of list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(documents::list).post(documents::upload))
        .route("/documents/preview", get(preview::preview))
        .route(
            "/documents/{id}",
            get(documents::get_by_id).delete(documents::delete),
        )
        .route("/documents/{id}/versions", post(documents::upload_version))
        .route("/documents/versions/{id}", put(documents::update_version))
        .route(
            "/document-categories",
            get(document_categories::list).post(document_categories::create),
        )
}
