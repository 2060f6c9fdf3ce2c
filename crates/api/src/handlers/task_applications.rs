//! Handlers for worker applications (`/task-applications`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::types::DbId;
use efference_db::models::status::TaskApplicationStatus;
use efference_db::models::task_request::{
    ApprovalOutcome, ApprovedApplication, TaskApplication, TaskApplicationListQuery,
};
use efference_db::repositories::TaskApplicationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{page, parse_filter};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/task-applications
///
/// Trainers and workers see their own applications; admins see all.
pub async fn list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TaskApplicationListQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskApplication>>>> {
    let worker_filter = if auth.is_admin() {
        None
    } else if auth.is_performer() {
        Some(auth.user_id)
    } else {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not enough permissions".into(),
        )));
    };
    let status = parse_filter::<TaskApplicationStatus>(params.status.as_deref())?;
    let (limit, skip) = page(params.limit, params.skip);

    let applications =
        TaskApplicationRepo::list(&state.pool, None, worker_filter, status, limit, skip).await?;
    Ok(Json(DataResponse { data: applications }))
}

/// POST /api/v1/task-applications/{id}/approve
pub async fn approve_application(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApprovedApplication>>> {
    find_application(&state, id).await?;
    let approved = match TaskApplicationRepo::approve(&state.pool, id, admin.user_id).await? {
        ApprovalOutcome::Approved(approved) => approved,
        ApprovalOutcome::NotPending => return Err(not_pending()),
        ApprovalOutcome::RequestNotOpen => {
            return Err(AppError::BadRequest(
                "Task request is no longer open".into(),
            ))
        }
    };

    tracing::info!(
        application_id = %id,
        request_id = %approved.request.id,
        task_id = %approved.task_id,
        approved_by = %admin.user_id,
        "Task application approved",
    );
    Ok(Json(DataResponse { data: approved }))
}

/// POST /api/v1/task-applications/{id}/reject
pub async fn reject_application(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskApplication>>> {
    find_application(&state, id).await?;
    let rejected = TaskApplicationRepo::reject(&state.pool, id, admin.user_id)
        .await?
        .ok_or_else(not_pending)?;

    tracing::info!(application_id = %id, rejected_by = %admin.user_id, "Task application rejected");
    Ok(Json(DataResponse { data: rejected }))
}

/// DELETE /api/v1/task-applications/{id}
///
/// The applicant may withdraw while the application is pending; admins
/// may delete at any time.
pub async fn delete_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let application = find_application(&state, id).await?;
    if !auth.is_admin() {
        auth.ensure_self_or_admin(application.worker_id)?;
        if application.status != TaskApplicationStatus::Pending.as_str() {
            return Err(AppError::BadRequest(
                "Only pending applications can be withdrawn".into(),
            ));
        }
    }
    TaskApplicationRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_application(state: &AppState, id: DbId) -> AppResult<TaskApplication> {
    TaskApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TaskApplication",
            id,
        }))
}

fn not_pending() -> AppError {
    AppError::BadRequest("Application is no longer pending".into())
}
