//! Route definitions for signed local file serving.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET /files/local/{*path}  -> HMAC-signed local file serving (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/files/local/{*path}", get(files::serve_local))
}
