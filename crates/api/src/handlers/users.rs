//! Handlers for the `/users` resource.
//!
//! Listing, creation and deletion are admin-only. Reads and updates of a
//! single user are open to that user and to admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::roles::parse_role;
use efference_core::types::DbId;
use efference_db::models::user::{
    CreateUser, UpdateUser, User, UserListQuery, UserResponse, UserStatistics,
};
use efference_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::page;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Request body for `PUT /users/{id}/password`.
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let role = params
        .role
        .as_deref()
        .map(parse_role)
        .transpose()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let (limit, skip) = page(params.limit, params.skip);

    let users = UserRepo::list(&state.pool, role, limit, skip).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    let role = parse_role(&input.role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email,
            password_hash,
            role: role.to_string(),
            is_invited: false,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, created_by = %admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// GET /api/v1/users/me/role
pub async fn my_role(auth: AuthUser) -> Json<DataResponse<RoleResponse>> {
    Json(DataResponse {
        data: RoleResponse { role: auth.role },
    })
}

/// GET /api/v1/users/email/{email}
pub async fn get_user_by_email(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(email): Path<String>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {email} not found")))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.ensure_self_or_admin(id)?;
    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/{id}
///
/// Partial update. `role` and `is_active` are admin-only fields.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    auth.ensure_self_or_admin(id)?;
    input.validate()?;

    if !auth.is_admin() && (input.role.is_some() || input.is_active.is_some()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only admins can change role or active status".into(),
        )));
    }

    if let Some(role) = input.role.as_deref() {
        let role = parse_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        input.role = Some(role.to_string());
    }

    if let Some(email) = input.email.as_deref() {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if existing.id != id {
                return Err(AppError::BadRequest("Email already registered".into()));
            }
        }
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = %id, updated_by = %auth.user_id, "User updated");
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/{id}/password
///
/// Admins may reset any password. Everyone else must confirm their current one.
pub async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SetPasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    auth.ensure_self_or_admin(id)?;
    let user = find_user(&state, id).await?;

    if !auth.is_admin() {
        let current = input
            .current_password
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("current_password is required".into()))?;
        let valid = verify_password(current, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !valid {
            return Err(AppError::BadRequest("Incorrect current password".into()));
        }
    }

    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, id, &password_hash).await?;

    tracing::info!(user_id = %id, changed_by = %auth.user_id, "Password updated");
    Ok(Json(DataResponse {
        data: MessageResponse::new("Password updated successfully"),
    }))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.user_id == id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    tracing::info!(user_id = %id, deleted_by = %admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/{id}/statistics
pub async fn user_statistics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserStatistics>>> {
    auth.ensure_self_or_admin(id)?;
    let user = find_user(&state, id).await?;
    let stats = UserRepo::statistics(&state.pool, &user).await?;
    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}
