//! Handlers for the `/project-categories` resource.
//!
//! Invoked from inside the project editor, so the mutating endpoints
//! return the full re-sorted list along with the changed row -- the
//! editor swaps its dropdown contents without a second round trip.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::categories::{next_sort_order, sort_for_display};
use portal_core::error::CoreError;
use portal_core::slug::slugify;
use portal_core::types::DbId;
use serde::{Deserialize, Serialize};

use portal_db::models::project_category::{CreateProjectCategory, ProjectCategory};
use portal_db::repositories::ProjectCategoryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /project-categories/{id}/order`.
#[derive(Debug, Deserialize)]
pub struct SetOrderRequest {
    /// New sort position; `null` clears it (unranked sorts last).
    pub sort_order: Option<i32>,
}

/// Mutation response: the changed row plus the re-sorted full list.
#[derive(Debug, Serialize)]
pub struct CategoryMutationResponse {
    pub category: ProjectCategory,
    pub categories: Vec<ProjectCategory>,
}

/// GET /api/v1/project-categories
///
/// All categories in display order (sort_order ascending, unranked last,
/// name tiebreak).
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectCategory>>>> {
    let categories = ProjectCategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/project-categories
///
/// Create a category. The slug is derived from the name with the same
/// rule as project slugs; a missing sort position defaults to
/// `max(existing) + 1` (or 1 for the first category).
pub async fn create(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectCategory>,
) -> AppResult<(StatusCode, Json<CategoryMutationResponse>)> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Category name is required".into(),
        )));
    }

    let mut existing = ProjectCategoryRepo::list(&state.pool).await?;
    let sort_order = input.sort_order.or_else(|| Some(next_sort_order(&existing)));

    let input = CreateProjectCategory {
        name: name.clone(),
        sort_order,
    };
    let created = ProjectCategoryRepo::create(&state.pool, &input, &slugify(&name), sort_order)
        .await?;

    existing.push(created.clone());
    sort_for_display(&mut existing);

    Ok((
        StatusCode::CREATED,
        Json(CategoryMutationResponse {
            category: created,
            categories: existing,
        }),
    ))
}

/// PUT /api/v1/project-categories/{id}/order
///
/// Re-rank one category; only `sort_order` is touched.
pub async fn set_order(
    RequireEditor(_user): RequireEditor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetOrderRequest>,
) -> AppResult<Json<CategoryMutationResponse>> {
    let updated = ProjectCategoryRepo::set_sort_order(&state.pool, id, input.sort_order)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectCategory",
            id,
        }))?;

    let mut categories = ProjectCategoryRepo::list(&state.pool).await?;
    sort_for_display(&mut categories);

    Ok(Json(CategoryMutationResponse {
        category: updated,
        categories,
    }))
}
