//! Handlers for client task requests (`/task-requests`).
//!
//! Clients post requests and only ever see their own. Workers and trainers
//! apply to open requests; see [`super::task_applications`] for the admin
//! side of the workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::roles::ROLE_CLIENT;
use efference_core::types::DbId;
use efference_db::models::status::TaskRequestStatus;
use efference_db::models::task_request::{
    CreateTaskApplication, CreateTaskRequest, TaskApplication, TaskRequest,
    TaskRequestListQuery, UpdateTaskRequest,
};
use efference_db::repositories::{TaskApplicationRepo, TaskRequestRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequirePerformer};
use crate::query::{page, parse_filter, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/task-requests
pub async fn create_request(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskRequest>>)> {
    input.validate()?;
    let request = TaskRequestRepo::create(&state.pool, client.user_id, &input).await?;
    tracing::info!(request_id = %request.id, client_id = %client.user_id, "Task request created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/task-requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TaskRequestListQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskRequest>>>> {
    let status = parse_filter::<TaskRequestStatus>(params.status.as_deref())?;
    let client_filter = (auth.role == ROLE_CLIENT).then_some(auth.user_id);
    let (limit, skip) = page(params.limit, params.skip);

    let requests = TaskRequestRepo::list(&state.pool, client_filter, status, limit, skip).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/task-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskRequest>>> {
    let request = find_request(&state, id).await?;
    if auth.role == ROLE_CLIENT && request.client_id != auth.user_id {
        return Err(forbidden());
    }
    Ok(Json(DataResponse { data: request }))
}

/// PUT /api/v1/task-requests/{id}
///
/// Only open requests can be edited. The one status a client may set is
/// `closed`.
pub async fn update_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskRequest>,
) -> AppResult<Json<DataResponse<TaskRequest>>> {
    input.validate()?;
    let request = find_request(&state, id).await?;
    auth.ensure_self_or_admin(request.client_id)?;

    if request.status != TaskRequestStatus::Open.as_str() {
        return Err(AppError::BadRequest(
            "Only open task requests can be modified".into(),
        ));
    }

    let status = parse_filter::<TaskRequestStatus>(input.status.as_deref())?;
    if matches!(status, Some(s) if s != TaskRequestStatus::Closed) {
        return Err(AppError::BadRequest(
            "Task request status can only be changed to closed".into(),
        ));
    }

    let updated = TaskRequestRepo::update(
        &state.pool,
        id,
        input.title.as_deref(),
        input.description.as_deref(),
        status,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "TaskRequest",
        id,
    }))?;

    if status == Some(TaskRequestStatus::Closed) {
        let rejected =
            TaskApplicationRepo::reject_pending_for_request(&state.pool, id, auth.user_id).await?;
        tracing::info!(
            request_id = %id,
            closed_by = %auth.user_id,
            rejected_applications = rejected,
            "Task request closed",
        );
    }
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/task-requests/{id}
pub async fn delete_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let request = find_request(&state, id).await?;
    auth.ensure_self_or_admin(request.client_id)?;
    TaskRequestRepo::delete(&state.pool, id).await?;
    tracing::info!(request_id = %id, deleted_by = %auth.user_id, "Task request deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/task-requests/{id}/applications
pub async fn apply(
    State(state): State<AppState>,
    RequirePerformer(worker): RequirePerformer,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTaskApplication>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskApplication>>)> {
    input.validate()?;
    let request = find_request(&state, id).await?;
    if request.status != TaskRequestStatus::Open.as_str() {
        return Err(AppError::BadRequest(
            "Task request is not open for applications".into(),
        ));
    }
    if TaskApplicationRepo::exists(&state.pool, id, worker.user_id).await? {
        return Err(AppError::BadRequest(
            "You have already applied to this task request".into(),
        ));
    }

    let application =
        TaskApplicationRepo::create(&state.pool, id, worker.user_id, input.message.as_deref())
            .await?;
    tracing::info!(
        application_id = %application.id,
        request_id = %id,
        worker_id = %worker.user_id,
        "Task application submitted",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: application })))
}

/// GET /api/v1/task-requests/{id}/applications
pub async fn list_request_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<TaskApplication>>>> {
    let request = find_request(&state, id).await?;
    auth.ensure_self_or_admin(request.client_id)?;
    let (limit, skip) = params.resolve();

    let applications =
        TaskApplicationRepo::list(&state.pool, Some(id), None, None, limit, skip).await?;
    Ok(Json(DataResponse { data: applications }))
}

async fn find_request(state: &AppState, id: DbId) -> AppResult<TaskRequest> {
    TaskRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TaskRequest",
            id,
        }))
}

fn forbidden() -> AppError {
    AppError::Core(CoreError::Forbidden("Not enough permissions".into()))
}
