//! Processing job (external pipeline execution record) model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::status::ProcessingJobStatus;

/// A row from the `processing_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProcessingJob {
    pub id: DbId,
    pub session_id: DbId,
    pub step_function_execution_arn: String,
    pub batch_job_id_concat: Option<String>,
    pub batch_job_id_transcode: Option<String>,
    pub status: String,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
}

/// DTO for `POST /api/v1/sessions/{id}/processing-jobs`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProcessingJob {
    pub session_id: DbId,
    #[validate(length(min = 1, max = 2048))]
    pub step_function_execution_arn: String,
    pub batch_job_id_concat: Option<String>,
    pub batch_job_id_transcode: Option<String>,
    /// Defaults to `running`.
    pub status: Option<ProcessingJobStatus>,
}

/// DTO for updating a processing job. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProcessingJob {
    pub status: Option<ProcessingJobStatus>,
    pub batch_job_id_concat: Option<String>,
    pub batch_job_id_transcode: Option<String>,
    pub end_time: Option<Timestamp>,
}
