//! Handlers for the `/task-assignments` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::roles::is_performer;
use efference_core::types::DbId;
use efference_db::models::task_assignment::{
    CreateTaskAssignment, TaskAssignment, TaskAssignmentListQuery,
};
use efference_db::repositories::{TaskAssignmentRepo, TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/task-assignments
///
/// Admins see every assignment and may filter; trainers and workers only
/// ever see their own.
pub async fn list_assignments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TaskAssignmentListQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskAssignment>>>> {
    let user_filter = if auth.is_admin() {
        params.user_id
    } else if auth.is_performer() {
        Some(auth.user_id)
    } else {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not enough permissions".into(),
        )));
    };
    let (limit, skip) = page(params.limit, params.skip);

    let assignments =
        TaskAssignmentRepo::list(&state.pool, params.task_id, user_filter, limit, skip).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/task-assignments
pub async fn create_assignment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateTaskAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskAssignment>>)> {
    let assignment = assign_user(&state, input.task_id, input.user_id).await?;
    tracing::info!(
        assignment_id = %assignment.id,
        task_id = %assignment.task_id,
        user_id = %assignment.user_id,
        assigned_by = %admin.user_id,
        "Task assigned",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// GET /api/v1/task-assignments/{id}
pub async fn get_assignment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskAssignment>>> {
    let assignment = TaskAssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TaskAssignment",
            id,
        }))?;
    auth.ensure_self_or_admin(assignment.user_id)?;
    Ok(Json(DataResponse { data: assignment }))
}

/// DELETE /api/v1/task-assignments/{id}
pub async fn delete_assignment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskAssignmentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TaskAssignment",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Validate and insert an assignment. Shared with `POST /tasks/{id}/assignments`.
pub(crate) async fn assign_user(
    state: &AppState,
    task_id: DbId,
    user_id: DbId,
) -> AppResult<TaskAssignment> {
    TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    if !is_performer(&user.role) {
        return Err(AppError::BadRequest(
            "Tasks can only be assigned to trainers or workers".into(),
        ));
    }
    if TaskAssignmentRepo::exists(&state.pool, task_id, user_id).await? {
        return Err(AppError::BadRequest(
            "User is already assigned to this task".into(),
        ));
    }

    Ok(TaskAssignmentRepo::create(&state.pool, task_id, user_id).await?)
}
