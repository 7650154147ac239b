//! Route definitions for projects and project categories.

use axum::routing::{get, post, put};
use axum::Router;

use crate::editor_ws;
use crate::handlers::{project_categories, projects};
use crate::state::AppState;

/// Project and project-category routes.
///
/// ```text
/// GET  /projects                        -> filtered, paginated listing
/// POST /projects                        -> commit-create (validated + revision)
/// POST /projects/draft                  -> draft-create (lenient)
/// PUT  /projects/draft/{id}             -> draft-update (lenient)
/// GET  /projects/editor                 -> WebSocket autosave editor
/// GET  /projects/by-slug/{slug}         -> published project (public)
/// GET  /projects/{id}                   -> single project
/// PUT  /projects/{id}                   -> commit-update (validated + revision)
/// DELETE /projects/{id}                 -> delete row + storage objects
/// POST /projects/{id}/images            -> upload cover/gallery (multipart)
/// GET  /projects/{id}/revisions         -> audit trail
///
/// GET  /project-categories              -> display-ordered list
/// POST /project-categories              -> create (slug + default order)
/// PUT  /project-categories/{id}/order   -> re-rank one category
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/draft", post(projects::create_draft))
        .route("/projects/draft/{id}", put(projects::update_draft))
        .route("/projects/editor", get(editor_ws::editor_ws))
        .route("/projects/by-slug/{slug}", get(projects::get_by_slug))
        .route(
            "/projects/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/projects/{id}/images", post(projects::upload_images))
        .route("/projects/{id}/revisions", get(projects::revisions))
        .route(
            "/project-categories",
            get(project_categories::list).post(project_categories::create),
        )
        .route(
            "/project-categories/{id}/order",
            put(project_categories::set_order),
        )
}
