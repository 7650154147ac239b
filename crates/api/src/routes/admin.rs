//! Route definitions for the `/admin` resource (user administration).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/admin`. All handlers enforce the admin role via
/// the `RequireAdmin` extractor.
///
/// ```text
/// GET    /users              -> list users with roles
/// POST   /users              -> create silently (no invite mail)
/// POST   /users/invite       -> create-or-reinvite with mail
/// PUT    /users/{id}         -> set display name
/// DELETE /users/{id}         -> delete user + avatar object
/// PUT    /users/{id}/role    -> set role
/// POST   /users/{id}/avatar  -> upload avatar (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/invite", post(users::invite))
        .route("/users/{id}", put(users::set_name).delete(users::delete))
        .route("/users/{id}/role", put(users::set_role))
        .route("/users/{id}/avatar", post(users::upload_avatar))
}
