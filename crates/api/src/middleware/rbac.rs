//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role is not
//! in its allow-list with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use efference_core::error::CoreError;
use efference_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_REVIEWER, ROLE_TRAINER, ROLE_WORKER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[&str],
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed.contains(&user.role.as_str()) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `reviewer` or `admin`.
pub struct RequireReviewer(pub AuthUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_REVIEWER, ROLE_ADMIN],
            "Reviewer or Admin role required",
        )
        .await
        .map(RequireReviewer)
    }
}

/// Requires `client` or `admin`.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_CLIENT, ROLE_ADMIN],
            "Client or Admin role required",
        )
        .await
        .map(RequireClient)
    }
}

/// Requires `trainer` or `worker`, the roles that take on work.
pub struct RequirePerformer(pub AuthUser);

impl FromRequestParts<AppState> for RequirePerformer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_TRAINER, ROLE_WORKER],
            "Trainer or Worker role required",
        )
        .await
        .map(RequirePerformer)
    }
}
