//! Handlers for the `/auth` resource (login, registration, current user).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use efference_core::error::CoreError;
use efference_core::invitation::{emails_match, is_expired};
use efference_db::models::status::InvitationStatus;
use efference_db::models::user::{CreateUser, User, UserResponse};
use efference_db::repositories::{InvitationRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub invitation_code: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Successful authentication response returned by login and register.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Inactive user".into(),
        )));
    }

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(token_response(&state, user)?))
}

/// POST /api/v1/auth/register
///
/// Redeem an invitation code and create the invited user. The new account
/// takes the invitation's role.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    input.validate()?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let invitation = InvitationRepo::find_by_code(&state.pool, input.invitation_code.trim())
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid invitation code".into()))?;

    let redeemable = invitation
        .status
        .parse::<InvitationStatus>()
        .map(InvitationStatus::is_redeemable)
        .unwrap_or(false);
    if !redeemable {
        return Err(AppError::BadRequest(format!(
            "Invitation has already been {}",
            invitation.status
        )));
    }

    if !emails_match(&invitation.email, &input.email) {
        return Err(AppError::BadRequest(
            "Email does not match the invitation".into(),
        ));
    }

    if is_expired(invitation.expires_at, Utc::now()) {
        InvitationRepo::mark_expired(&state.pool, invitation.id).await?;
        return Err(AppError::BadRequest("Invitation has expired".into()));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        name: input.name.trim().to_string(),
        email: input.email,
        password_hash,
        role: invitation.role.clone(),
        is_invited: true,
    };

    // Another registration may have claimed the code since the checks above.
    let user = InvitationRepo::redeem(&state.pool, invitation.id, &create)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invitation is no longer valid".into()))?;

    tracing::info!(
        user_id = %user.id,
        invitation_id = %invitation.id,
        role = %user.role,
        "User registered from invitation",
    );
    Ok((StatusCode::CREATED, Json(token_response(&state, user)?)))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_current_user(&state, &auth).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let user = find_current_user(&state, &auth).await?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::BadRequest("Incorrect current password".into()));
    }

    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(DataResponse {
        data: MessageResponse::new("Password updated successfully"),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_current_user(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))
}

fn token_response(state: &AppState, user: User) -> AppResult<TokenResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user: user.into(),
    })
}
