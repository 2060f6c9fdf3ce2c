//! Client task requests and worker applications.
//!
//! A client posts a [`TaskRequest`]; workers answer it with a
//! [`TaskApplication`]; an admin approves one application, which turns the
//! request into a task assignment.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Task requests
// ---------------------------------------------------------------------------

/// A row from the `task_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRequest {
    pub id: DbId,
    pub client_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// Task created when an application was approved.
    pub task_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/task-requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
}

/// DTO for `PUT /api/v1/task-requests/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Only `closed` is accepted from clients.
    pub status: Option<String>,
}

/// Query parameters for `GET /api/v1/task-requests`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskRequestListQuery {
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Task applications
// ---------------------------------------------------------------------------

/// A row from the `task_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskApplication {
    pub id: DbId,
    pub request_id: DbId,
    pub worker_id: DbId,
    pub message: Option<String>,
    pub status: String,
    pub decided_by_id: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/task-requests/{id}/applications`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateTaskApplication {
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

/// Query parameters for `GET /api/v1/task-applications`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskApplicationListQuery {
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Everything written when an application is approved.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedApplication {
    pub application: TaskApplication,
    pub request: TaskRequest,
    pub task_id: DbId,
    pub assignment_id: DbId,
}

/// Result of trying to approve an application.
#[derive(Debug, Clone)]
pub enum ApprovalOutcome {
    Approved(ApprovedApplication),
    /// The application is missing or was already decided.
    NotPending,
    /// The request was closed or fulfilled while the application waited.
    RequestNotOpen,
}
