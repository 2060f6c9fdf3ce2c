//! Handlers for the `/invitations` resource.
//!
//! Invitations are the only way onto the platform: an admin issues one per
//! email address, optionally emails it, and the recipient redeems the code
//! through `POST /auth/register`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use efference_core::error::CoreError;
use efference_core::invitation::{
    expiry_from, generate_invitation_code, is_expired, validate_expires_in_days,
    DEFAULT_EXPIRES_IN_DAYS,
};
use efference_core::roles::parse_role;
use efference_core::types::{DbId, Timestamp};
use efference_db::models::invitation::{CreateInvitation, Invitation, InvitationListQuery};
use efference_db::models::status::InvitationStatus;
use efference_db::repositories::{InvitationRepo, UserRepo};
use efference_events::templates::invitation_email;
use efference_events::Mailer;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::{page, parse_filter};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email)]
    pub email: String,
    pub role: String,
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvitationRequest {
    pub status: InvitationStatus,
}

/// Public view of an invitation code, shown on the registration page.
#[derive(Debug, Serialize)]
pub struct InvitationValidation {
    pub valid: bool,
    pub email: String,
    pub role: String,
    pub expires_at: Timestamp,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Invitation>>)> {
    input.validate()?;
    let role = parse_role(&input.role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let days = input.expires_in_days.unwrap_or(DEFAULT_EXPIRES_IN_DAYS);
    validate_expires_in_days(days).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = input.email.trim().to_lowercase();
    if UserRepo::email_exists(&state.pool, &email).await? {
        return Err(AppError::BadRequest(
            "A user with this email already exists".into(),
        ));
    }
    if InvitationRepo::has_live_invitation(&state.pool, &email).await? {
        return Err(AppError::BadRequest(
            "An active invitation already exists for this email".into(),
        ));
    }

    let invitation = InvitationRepo::create(
        &state.pool,
        &CreateInvitation {
            code: generate_invitation_code(),
            email,
            role: role.to_string(),
            invited_by_id: Some(admin.user_id),
            expires_at: expiry_from(Utc::now(), days),
        },
    )
    .await?;

    tracing::info!(
        invitation_id = %invitation.id,
        role = %invitation.role,
        invited_by = %admin.user_id,
        "Invitation created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invitation })))
}

/// GET /api/v1/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<InvitationListQuery>,
) -> AppResult<Json<DataResponse<Vec<Invitation>>>> {
    let status = parse_filter::<InvitationStatus>(params.status.as_deref())?;
    let (limit, skip) = page(params.limit, params.skip);
    let invitations = InvitationRepo::list(&state.pool, status, limit, skip).await?;
    Ok(Json(DataResponse { data: invitations }))
}

/// GET /api/v1/invitations/{id}
pub async fn get_invitation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invitation>>> {
    let invitation = find_invitation(&state, id).await?;
    Ok(Json(DataResponse { data: invitation }))
}

/// PUT /api/v1/invitations/{id}
pub async fn update_invitation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvitationRequest>,
) -> AppResult<Json<DataResponse<Invitation>>> {
    let invitation = InvitationRepo::update_status(&state.pool, id, input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;
    Ok(Json(DataResponse { data: invitation }))
}

/// DELETE /api/v1/invitations/{id}
pub async fn delete_invitation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !InvitationRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/invitations/{id}/send
pub async fn send_invitation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Invitation>>> {
    let invitation = find_invitation(&state, id).await?;
    if invitation.status != InvitationStatus::Pending.as_str() {
        return Err(AppError::BadRequest(format!(
            "Cannot send an invitation with status {}",
            invitation.status
        )));
    }

    let mailer: Arc<dyn Mailer> = state
        .mailer
        .clone()
        .ok_or_else(|| AppError::InternalError("Email delivery is not configured".into()))?;
    let email = invitation_email(
        &invitation.email,
        &invitation.code,
        invitation.expires_at,
        &state.config.app_base_url,
    );
    mailer
        .send(email)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send invitation email: {e}")))?;

    let invitation = InvitationRepo::update_status(&state.pool, id, InvitationStatus::Sent)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    tracing::info!(invitation_id = %id, sent_by = %admin.user_id, "Invitation email sent");
    Ok(Json(DataResponse { data: invitation }))
}

/// GET /api/v1/invitations/validate/{code}
///
/// Public. Lets the registration page check a code before the user fills
/// in the form.
pub async fn validate_invitation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<InvitationValidation>>> {
    let mut invitation = InvitationRepo::find_by_code(&state.pool, code.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;

    let redeemable = invitation
        .status
        .parse::<InvitationStatus>()
        .map(InvitationStatus::is_redeemable)
        .unwrap_or(false);
    let expired = is_expired(invitation.expires_at, Utc::now());

    if redeemable && expired && InvitationRepo::mark_expired(&state.pool, invitation.id).await? {
        invitation.status = InvitationStatus::Expired.to_string();
    }

    Ok(Json(DataResponse {
        data: InvitationValidation {
            valid: redeemable && !expired,
            email: invitation.email,
            role: invitation.role,
            expires_at: invitation.expires_at,
            status: invitation.status,
        },
    }))
}

async fn find_invitation(state: &AppState, id: DbId) -> AppResult<Invitation> {
    InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))
}
