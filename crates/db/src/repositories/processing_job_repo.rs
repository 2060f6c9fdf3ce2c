//! Repository for the `processing_jobs` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::processing_job::{CreateProcessingJob, ProcessingJob, UpdateProcessingJob};
use crate::models::status::ProcessingJobStatus;

const COLUMNS: &str = "id, session_id, step_function_execution_arn, batch_job_id_concat, \
                       batch_job_id_transcode, status, start_time, end_time";

/// Provides CRUD operations for pipeline execution records.
pub struct ProcessingJobRepo;

impl ProcessingJobRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProcessingJob,
    ) -> Result<ProcessingJob, sqlx::Error> {
        let status = input.status.unwrap_or(ProcessingJobStatus::Running);
        let query = format!(
            "INSERT INTO processing_jobs
                (session_id, step_function_execution_arn, batch_job_id_concat,
                 batch_job_id_transcode, status, end_time)
             VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'running' THEN NULL ELSE NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProcessingJob>(&query)
            .bind(input.session_id)
            .bind(&input.step_function_execution_arn)
            .bind(&input.batch_job_id_concat)
            .bind(&input.batch_job_id_transcode)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProcessingJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM processing_jobs WHERE id = $1");
        sqlx::query_as::<_, ProcessingJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All jobs of a session, newest first.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<ProcessingJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM processing_jobs WHERE session_id = $1 ORDER BY start_time DESC"
        );
        sqlx::query_as::<_, ProcessingJob>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Update a job. A job leaving `running` without an explicit
    /// `end_time` is stamped with the current time.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProcessingJob,
    ) -> Result<Option<ProcessingJob>, sqlx::Error> {
        let query = format!(
            "UPDATE processing_jobs SET
                status = COALESCE($2, status),
                batch_job_id_concat = COALESCE($3, batch_job_id_concat),
                batch_job_id_transcode = COALESCE($4, batch_job_id_transcode),
                end_time = COALESCE(
                    $5,
                    end_time,
                    CASE WHEN $2 IS NOT NULL AND $2 <> 'running' THEN NOW() END
                )
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProcessingJob>(&query)
            .bind(id)
            .bind(input.status.map(ProcessingJobStatus::as_str))
            .bind(&input.batch_job_id_concat)
            .bind(&input.batch_job_id_transcode)
            .bind(input.end_time)
            .fetch_optional(pool)
            .await
    }
}
