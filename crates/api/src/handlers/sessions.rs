//! Handlers for video sessions and their clips and processing jobs.
//!
//! Trainers and workers only ever see sessions they created. Reviewers and
//! admins see everything.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::types::DbId;
use efference_db::models::processing_job::{
    CreateProcessingJob, ProcessingJob, UpdateProcessingJob,
};
use efference_db::models::raw_clip::{CreateRawClip, RawClip, UpdateRawClip};
use efference_db::models::status::{parse_status_list, ProcessingJobStatus, VideoSessionStatus};
use efference_db::models::video_session::{
    CreateVideoSession, CreateVideoSessionFromUpload, UpdateVideoSession, VideoSession, VideoSessionDetails,
    VideoSessionFilter, VideoSessionListQuery,
};
use efference_db::repositories::{
    ProcessingJobRepo, RawClipRepo, TaskRepo, UserRepo, VideoSessionRepo,
};
use efference_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireReviewer};
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateVideoSession>,
) -> AppResult<(StatusCode, Json<DataResponse<VideoSession>>)> {
    let creator_id = match input.creator_id {
        Some(creator_id) if creator_id != auth.user_id => {
            if !auth.is_admin() {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only admins can create sessions for other users".into(),
                )));
            }
            creator_id
        }
        _ => auth.user_id,
    };

    ensure_user_exists(&state.pool, creator_id).await?;
    TaskRepo::find_by_id(&state.pool, input.task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: input.task_id,
        }))?;
    if let Some(reviewer_id) = input.reviewer_id {
        ensure_user_exists(&state.pool, reviewer_id).await?;
    }

    let session =
        VideoSessionRepo::create(&state.pool, creator_id, input.task_id, input.reviewer_id)
            .await?;
    tracing::info!(
        session_id = %session.id,
        creator_id = %creator_id,
        task_id = %input.task_id,
        "Video session created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// POST /api/v1/sessions/upload
///
/// Session for the caller's own upload. Without a `task_id` the oldest
/// active task is used; with no task at all the request is refused.
pub async fn create_session_from_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateVideoSessionFromUpload>,
) -> AppResult<(StatusCode, Json<DataResponse<VideoSession>>)> {
    let task = match input.task_id {
        Some(task_id) => TaskRepo::find_by_id(&state.pool, task_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }))?,
        None => TaskRepo::first_active(&state.pool).await?.ok_or_else(|| {
            AppError::BadRequest("No tasks available. Please create a task first.".into())
        })?,
    };

    let session = VideoSessionRepo::create(&state.pool, auth.user_id, task.id, None).await?;
    tracing::info!(
        session_id = %session.id,
        creator_id = %auth.user_id,
        task_id = %task.id,
        defaulted_task = input.task_id.is_none(),
        "Video session created for upload",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/sessions
///
/// `status` accepts a comma-separated list (`?status=uploading,processing`).
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<VideoSessionListQuery>,
) -> AppResult<Json<DataResponse<Vec<VideoSession>>>> {
    let statuses = match params.status.as_deref() {
        Some(raw) => parse_status_list::<VideoSessionStatus>(raw)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?,
        None => Vec::new(),
    };
    let creator_id = if auth.is_performer() {
        Some(auth.user_id)
    } else {
        params.creator_id
    };
    let filter = VideoSessionFilter {
        creator_id,
        reviewer_id: params.reviewer_id,
        task_id: params.task_id,
        statuses,
    };
    let (limit, skip) = page(params.limit, params.skip);

    let sessions = VideoSessionRepo::list(&state.pool, &filter, limit, skip).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoSessionDetails>>> {
    let session = find_visible_session(&state, &auth, id).await?;
    let details = VideoSessionRepo::load_details(&state.pool, session).await?;
    Ok(Json(DataResponse { data: details }))
}

/// PUT /api/v1/sessions/{id}
pub async fn update_session(
    State(state): State<AppState>,
    RequireReviewer(reviewer): RequireReviewer,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVideoSession>,
) -> AppResult<Json<DataResponse<VideoSession>>> {
    if let Some(reviewer_id) = input.reviewer_id {
        ensure_user_exists(&state.pool, reviewer_id).await?;
    }
    let session = VideoSessionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VideoSession",
            id,
        }))?;
    tracing::info!(session_id = %id, status = %session.status, updated_by = %reviewer.user_id, "Video session updated");
    Ok(Json(DataResponse { data: session }))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !VideoSessionRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "VideoSession",
            id,
        }));
    }
    tracing::info!(session_id = %id, deleted_by = %admin.user_id, "Video session deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Raw clips
// ---------------------------------------------------------------------------

/// GET /api/v1/sessions/{id}/clips
pub async fn list_clips(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RawClip>>>> {
    find_visible_session(&state, &auth, id).await?;
    let clips = RawClipRepo::list_by_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: clips }))
}

/// POST /api/v1/sessions/{id}/clips
pub async fn create_clip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateRawClip>,
) -> AppResult<(StatusCode, Json<DataResponse<RawClip>>)> {
    if input.session_id != id {
        return Err(AppError::BadRequest(
            "session_id in body does not match the URL".into(),
        ));
    }
    input.validate()?;
    find_visible_session(&state, &auth, id).await?;

    let clip = RawClipRepo::create(&state.pool, &input).await?;
    tracing::info!(session_id = %id, clip_id = %clip.id, part_number = clip.part_number, "Raw clip recorded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: clip })))
}

/// PUT /api/v1/sessions/clips/{clip_id}
pub async fn update_clip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(clip_id): Path<DbId>,
    Json(input): Json<UpdateRawClip>,
) -> AppResult<Json<DataResponse<RawClip>>> {
    input.validate()?;
    let clip = RawClipRepo::find_by_id(&state.pool, clip_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RawClip",
            id: clip_id,
        }))?;
    find_visible_session(&state, &auth, clip.session_id).await?;

    let clip = RawClipRepo::update(&state.pool, clip_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RawClip",
            id: clip_id,
        }))?;
    Ok(Json(DataResponse { data: clip }))
}

/// DELETE /api/v1/sessions/clips/{clip_id}
pub async fn delete_clip(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(clip_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RawClipRepo::delete(&state.pool, clip_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "RawClip",
            id: clip_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Processing jobs
// ---------------------------------------------------------------------------

/// GET /api/v1/sessions/{id}/processing-jobs
pub async fn list_processing_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProcessingJob>>>> {
    find_visible_session(&state, &auth, id).await?;
    let jobs = ProcessingJobRepo::list_by_session(&state.pool, id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// POST /api/v1/sessions/{id}/processing-jobs
pub async fn create_processing_job(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<CreateProcessingJob>,
) -> AppResult<(StatusCode, Json<DataResponse<ProcessingJob>>)> {
    if input.session_id != id {
        return Err(AppError::BadRequest(
            "session_id in body does not match the URL".into(),
        ));
    }
    input.validate()?;
    find_session(&state.pool, id).await?;

    let job = ProcessingJobRepo::create(&state.pool, &input).await?;
    tracing::info!(session_id = %id, job_id = %job.id, "Processing job recorded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// PUT /api/v1/sessions/processing-jobs/{job_id}
///
/// A job that finishes drives its session forward: `succeeded` moves a
/// processing session to review, `failed` fails the session.
pub async fn update_processing_job(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(job_id): Path<DbId>,
    Json(input): Json<UpdateProcessingJob>,
) -> AppResult<Json<DataResponse<ProcessingJob>>> {
    let job = ProcessingJobRepo::update(&state.pool, job_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProcessingJob",
            id: job_id,
        }))?;

    match input.status {
        Some(ProcessingJobStatus::Succeeded) => {
            advance_session(
                &state.pool,
                job.session_id,
                VideoSessionStatus::Processing,
                VideoSessionStatus::PendingReview,
            )
            .await?;
        }
        Some(ProcessingJobStatus::Failed) => {
            let session = find_session(&state.pool, job.session_id).await?;
            if let Ok(current) = session.status.parse::<VideoSessionStatus>() {
                if current.can_transition_to(VideoSessionStatus::Failed) {
                    advance_session(
                        &state.pool,
                        session.id,
                        current,
                        VideoSessionStatus::Failed,
                    )
                    .await?;
                }
            }
        }
        _ => {}
    }

    Ok(Json(DataResponse { data: job }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply a guarded status transition, logging when it takes effect.
///
/// A session that already left `from` is left alone.
pub(crate) async fn advance_session(
    pool: &DbPool,
    session_id: DbId,
    from: VideoSessionStatus,
    to: VideoSessionStatus,
) -> AppResult<bool> {
    let moved = VideoSessionRepo::transition(pool, session_id, from, to)
        .await?
        .is_some();
    if moved {
        tracing::info!(session_id = %session_id, from = %from, to = %to, "Session status changed");
    }
    Ok(moved)
}

pub(crate) async fn find_session(pool: &DbPool, id: DbId) -> AppResult<VideoSession> {
    VideoSessionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VideoSession",
            id,
        }))
}

/// Load a session, hiding other people's sessions from trainers and workers.
async fn find_visible_session(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<VideoSession> {
    let session = find_session(&state.pool, id).await?;
    if auth.is_performer() {
        auth.ensure_self_or_admin(session.creator_id)?;
    }
    Ok(session)
}

async fn ensure_user_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(())
}
