//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::types::DbId;
use efference_db::models::task::{CreateTask, Task, TaskListQuery, UpdateTask};
use efference_db::models::task_assignment::TaskAssignment;
use efference_db::repositories::{TaskAssignmentRepo, TaskRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::task_assignments::assign_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{page, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /tasks/{id}/assignments`.
#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub user_id: DbId,
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    input.validate()?;
    let task = TaskRepo::create(&state.pool, admin.user_id, &input).await?;
    tracing::info!(task_id = %task.id, created_by = %admin.user_id, "Task created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TaskListQuery>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let (limit, skip) = page(params.limit, params.skip);
    let tasks = TaskRepo::list(&state.pool, &params, limit, skip).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = find_task(&state, id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    input.validate()?;
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Task", id }));
    }
    tracing::info!(task_id = %id, deleted_by = %admin.user_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/assignments
pub async fn assign_task(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskAssignment>>)> {
    let assignment = assign_user(&state, id, input.user_id).await?;
    tracing::info!(
        task_id = %id,
        user_id = %input.user_id,
        assigned_by = %admin.user_id,
        "Task assigned",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// GET /api/v1/tasks/{id}/assignments
pub async fn list_task_assignments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<TaskAssignment>>>> {
    find_task(&state, id).await?;
    let (limit, skip) = params.resolve();
    let assignments = TaskAssignmentRepo::list(&state.pool, Some(id), None, limit, skip).await?;
    Ok(Json(DataResponse { data: assignments }))
}

async fn find_task(state: &AppState, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))
}
