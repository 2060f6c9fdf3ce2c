//! Repository for the `video_sessions` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::status::VideoSessionStatus;
use crate::models::video_session::{
    UpdateVideoSession, VideoSession, VideoSessionDetails, VideoSessionFilter,
};

use super::{ProcessingJobRepo, RawClipRepo, ReviewRepo};

const COLUMNS: &str = "id, creator_id, task_id, reviewer_id, status, raw_concatenated_s3_key, \
                       processed_1080p_s3_key, step_function_task_token, created_at, updated_at";

/// Provides CRUD operations and status transitions for video sessions.
pub struct VideoSessionRepo;

impl VideoSessionRepo {
    /// Insert a new session in `uploading` status.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        task_id: DbId,
        reviewer_id: Option<DbId>,
    ) -> Result<VideoSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_sessions (creator_id, task_id, reviewer_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoSession>(&query)
            .bind(creator_id)
            .bind(task_id)
            .bind(reviewer_id)
            .bind(VideoSessionStatus::Uploading.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_sessions WHERE id = $1");
        sqlx::query_as::<_, VideoSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sessions, newest first. An empty `statuses` list means "any".
    pub async fn list(
        pool: &PgPool,
        filter: &VideoSessionFilter,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<VideoSession>, sqlx::Error> {
        let statuses: Option<Vec<String>> = if filter.statuses.is_empty() {
            None
        } else {
            Some(
                filter
                    .statuses
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            )
        };

        let query = format!(
            "SELECT {COLUMNS} FROM video_sessions
             WHERE ($1::UUID IS NULL OR creator_id = $1)
               AND ($2::UUID IS NULL OR reviewer_id = $2)
               AND ($3::UUID IS NULL OR task_id = $3)
               AND ($4::TEXT[] IS NULL OR status = ANY($4))
             ORDER BY created_at DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, VideoSession>(&query)
            .bind(filter.creator_id)
            .bind(filter.reviewer_id)
            .bind(filter.task_id)
            .bind(statuses)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Update a session. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideoSession,
    ) -> Result<Option<VideoSession>, sqlx::Error> {
        let query = format!(
            "UPDATE video_sessions SET
                status = COALESCE($2, status),
                reviewer_id = COALESCE($3, reviewer_id),
                raw_concatenated_s3_key = COALESCE($4, raw_concatenated_s3_key),
                processed_1080p_s3_key = COALESCE($5, processed_1080p_s3_key),
                step_function_task_token = COALESCE($6, step_function_task_token)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoSession>(&query)
            .bind(id)
            .bind(input.status.map(VideoSessionStatus::as_str))
            .bind(input.reviewer_id)
            .bind(&input.raw_concatenated_s3_key)
            .bind(&input.processed_1080p_s3_key)
            .bind(&input.step_function_task_token)
            .fetch_optional(pool)
            .await
    }

    /// Move a session from `from` to `to` only if it is still in `from`.
    ///
    /// Returns the updated row, or `None` when the session does not exist
    /// or has already left `from`.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: VideoSessionStatus,
        to: VideoSessionStatus,
    ) -> Result<Option<VideoSession>, sqlx::Error> {
        let query = format!(
            "UPDATE video_sessions SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoSession>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a session (cascades to clips, jobs and review).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM video_sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load clips, processing jobs and the review for a session.
    pub async fn load_details(
        pool: &PgPool,
        session: VideoSession,
    ) -> Result<VideoSessionDetails, sqlx::Error> {
        let raw_clips = RawClipRepo::list_by_session(pool, session.id).await?;
        let processing_jobs = ProcessingJobRepo::list_by_session(pool, session.id).await?;
        let review = ReviewRepo::find_by_session(pool, session.id).await?;
        Ok(VideoSessionDetails {
            session,
            raw_clips,
            processing_jobs,
            review,
        })
    }
}
