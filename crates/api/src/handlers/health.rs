//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Returns 200 with a database round-trip so load balancers see real
/// readiness, not just process liveness.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    portal_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
