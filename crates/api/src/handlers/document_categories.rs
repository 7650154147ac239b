//! Handlers for the `/document-categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use portal_core::categories::next_sort_order;
use portal_core::error::CoreError;
use serde::Deserialize;

use portal_db::models::document_category::DocumentCategory;
use portal_db::repositories::DocumentCategoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /document-categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// GET /api/v1/document-categories
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DocumentCategory>>>> {
    let categories = DocumentCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/document-categories
///
/// New categories land at the end of the list: `max(existing) + 1`.
pub async fn create(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<DocumentCategory>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Category name is required".into(),
        )));
    }

    let existing = DocumentCategoryRepo::list(&state.pool).await?;
    let sort_order = next_sort_order(&existing);

    let created = DocumentCategoryRepo::create(&state.pool, name, Some(sort_order)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
