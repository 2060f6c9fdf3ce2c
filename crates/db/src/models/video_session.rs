//! Video session entity model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::processing_job::ProcessingJob;
use super::raw_clip::RawClip;
use super::review::Review;
use super::status::VideoSessionStatus;

/// A row from the `video_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoSession {
    pub id: DbId,
    pub creator_id: DbId,
    pub task_id: DbId,
    pub reviewer_id: Option<DbId>,
    pub status: String,
    pub raw_concatenated_s3_key: Option<String>,
    pub processed_1080p_s3_key: Option<String>,
    pub step_function_task_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A session together with its clips, processing jobs and review.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSessionDetails {
    #[serde(flatten)]
    pub session: VideoSession,
    pub raw_clips: Vec<RawClip>,
    pub processing_jobs: Vec<ProcessingJob>,
    pub review: Option<Review>,
}

/// Body of `POST /api/v1/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateVideoSession {
    pub task_id: DbId,
    pub reviewer_id: Option<DbId>,
    /// Admins may record on behalf of another user; defaults to the caller.
    pub creator_id: Option<DbId>,
}

/// Body of `POST /api/v1/sessions/upload`.
///
/// Upload clients also send file metadata (name, size, content type); only
/// the task is read here, the rest arrives later through `/upload`.
#[derive(Debug, Deserialize)]
pub struct CreateVideoSessionFromUpload {
    /// Falls back to the oldest active task.
    pub task_id: Option<DbId>,
}

/// DTO for updating a session. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVideoSession {
    pub status: Option<VideoSessionStatus>,
    pub reviewer_id: Option<DbId>,
    pub raw_concatenated_s3_key: Option<String>,
    pub processed_1080p_s3_key: Option<String>,
    pub step_function_task_token: Option<String>,
}

/// Query parameters for `GET /api/v1/sessions`.
#[derive(Debug, Default, Deserialize)]
pub struct VideoSessionListQuery {
    pub creator_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub task_id: Option<DbId>,
    /// Comma-separated list of statuses, any case.
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved filter passed to the repository.
#[derive(Debug, Default)]
pub struct VideoSessionFilter {
    pub creator_id: Option<DbId>,
    pub reviewer_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub statuses: Vec<VideoSessionStatus>,
}
