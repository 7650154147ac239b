//! Route tree assembly.

pub mod admin;
pub mod auth;
pub mod documents;
pub mod files;
pub mod health;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires auth)
/// /auth/lookup                     email status lookup (public)
/// /auth/accept-invite              consume invite token (public)
///
/// /admin/users                     list, create (admin only)
/// /admin/users/invite              create-or-reinvite (admin only)
/// /admin/users/{id}                set name, delete
/// /admin/users/{id}/role           set role
/// /admin/users/{id}/avatar         upload avatar
///
/// /projects                        list, commit-create
/// /projects/draft                  draft-create
/// /projects/draft/{id}             draft-update
/// /projects/editor                 WebSocket autosave editor
/// /projects/by-slug/{slug}         published project (public)
/// /projects/{id}                   get, commit-update, delete
/// /projects/{id}/images            upload cover/gallery
/// /projects/{id}/revisions         audit trail
/// /project-categories              list, create
/// /project-categories/{id}/order   re-rank
///
/// /documents                       list, upload
/// /documents/preview               signed URL issuer
/// /documents/{id}                  get with versions, delete
/// /documents/{id}/versions         upload new version
/// /documents/versions/{id}         update version metadata
/// /document-categories             list, create
///
/// /files/local/{*path}             signed local file serving (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(projects::router())
        .merge(documents::router())
        .merge(files::router())
}
