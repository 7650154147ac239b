//! Handlers for the `/admin/users` resource.
//!
//! Wraps the auth tables with the profile fields the admin screen edits:
//! role, display name, avatar. All endpoints require the admin role.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use portal_core::documents::{avatar_content_type, avatar_path};
use portal_core::error::CoreError;
use portal_core::roles::ROLE_VIEWER;
use portal_core::types::DbId;
use serde::{Deserialize, Serialize};

use portal_db::models::user::{CreateUser, User, UserResponse};
use portal_db::repositories::{RoleRepo, UserRepo};

use crate::auth::jwt::generate_opaque_token;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A repeated invite to the same address within this window is a no-op.
const REINVITE_COOLDOWN_MINS: i64 = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users` and `POST /admin/users/invite`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub full_name: Option<String>,
    /// Role name; defaults to `viewer`.
    pub role: Option<String>,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct SetNameRequest {
    pub full_name: Option<String>,
}

/// Response body for `POST /admin/users/invite`.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    /// `"sent"` or `"skipped"` (cooldown window).
    pub status: &'static str,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a user exists, returning the full row.
async fn ensure_user_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Resolve a role name (defaulting to `viewer`) to its id.
async fn resolve_role_id(pool: &sqlx::PgPool, role: Option<&str>) -> AppResult<DbId> {
    let name = role.unwrap_or(ROLE_VIEWER);
    let role = RoleRepo::find_by_name(pool, name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{name}'"))))?;
    Ok(role.id)
}

/// Build the external-facing response for a user row.
async fn to_response(pool: &sqlx::PgPool, user: User) -> AppResult<UserResponse> {
    let role = RoleRepo::resolve_name(pool, user.role_id).await?;
    Ok(UserResponse {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role,
        role_id: user.role_id,
        avatar_path: user.avatar_path,
        is_active: user.is_active,
        invited_at: user.invited_at,
        last_sign_in_at: user.last_sign_in_at,
        created_at: user.created_at,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
///
/// List all users with resolved role names, newest first.
pub async fn list(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_with_roles(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/users
///
/// Create a user silently -- no invite mail is sent. The account has no
/// password until an invite is issued and accepted.
pub async fn create(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Email is required".into(),
        )));
    }

    let role_id = resolve_role_id(&state.pool, input.role.as_deref()).await?;
    let created = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            full_name: input.full_name.filter(|n| !n.is_empty()),
            password_hash: None,
            role_id,
        },
    )
    .await?;

    let response = to_response(&state.pool, created).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/admin/users/invite
///
/// Create the user if needed and issue an invite link. Re-inviting the
/// same address within the cooldown window is a deliberate no-op so a
/// double-clicked button does not spam the recipient.
pub async fn invite(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<Json<InviteResponse>> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Email is required".into(),
        )));
    }

    let user = match UserRepo::find_by_email(&state.pool, &email).await? {
        Some(existing) => {
            if let Some(invited_at) = existing.invited_at {
                let elapsed = Utc::now() - invited_at;
                if elapsed < chrono::Duration::minutes(REINVITE_COOLDOWN_MINS) {
                    let response = to_response(&state.pool, existing).await?;
                    return Ok(Json(InviteResponse {
                        status: "skipped",
                        user: response,
                    }));
                }
            }
            existing
        }
        None => {
            let role_id = resolve_role_id(&state.pool, input.role.as_deref()).await?;
            UserRepo::create(
                &state.pool,
                &CreateUser {
                    email: email.clone(),
                    full_name: input.full_name.filter(|n| !n.is_empty()),
                    password_hash: None,
                    role_id,
                },
            )
            .await?
        }
    };

    let (token, token_hash) = generate_opaque_token();
    UserRepo::record_invite(&state.pool, user.id, &token_hash).await?;

    let invite_link = format!(
        "{}/portal/invite?token={token}",
        state.config.public_base_url
    );
    state
        .mailer
        .send_invite(&email, user.full_name.as_deref(), &invite_link)
        .await?;

    let refreshed = ensure_user_exists(&state.pool, user.id).await?;
    let response = to_response(&state.pool, refreshed).await?;
    Ok(Json(InviteResponse {
        status: "sent",
        user: response,
    }))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn set_role(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let role_id = resolve_role_id(&state.pool, Some(&input.role)).await?;
    if !UserRepo::set_role(&state.pool, id, role_id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let user = ensure_user_exists(&state.pool, id).await?;
    let response = to_response(&state.pool, user).await?;
    Ok(Json(response))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update the display name; an empty name clears it.
pub async fn set_name(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetNameRequest>,
) -> AppResult<Json<UserResponse>> {
    let full_name = input.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if !UserRepo::set_full_name(&state.pool, id, full_name).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let user = ensure_user_exists(&state.pool, id).await?;
    let response = to_response(&state.pool, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/admin/users/{id}/avatar (multipart)
///
/// Upload an avatar image to the object store (upsert: one path per
/// user) and record its path.
pub async fn upload_avatar(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<UserResponse>> {
    ensure_user_exists(&state.pool, id).await?;

    let mut uploaded: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let mime_type = field.content_type().unwrap_or("image/png").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            continue;
        }

        let path = avatar_path(id, &file_name, &mime_type);
        state
            .object_store
            .put(
                &path,
                bytes.to_vec(),
                &avatar_content_type(&mime_type),
                true,
            )
            .await?;
        uploaded = Some(path);
    }

    let Some(path) = uploaded else {
        return Err(AppError::BadRequest("No avatar file provided".into()));
    };
    UserRepo::set_avatar_path(&state.pool, id, &path).await?;

    let user = ensure_user_exists(&state.pool, id).await?;
    let response = to_response(&state.pool, user).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Remove the avatar object, then the user row (sessions cascade).
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.user_id == id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot delete your own account".into(),
        )));
    }

    let user = ensure_user_exists(&state.pool, id).await?;
    if let Some(avatar) = &user.avatar_path {
        state.object_store.delete(&[avatar.clone()]).await?;
    }

    UserRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
