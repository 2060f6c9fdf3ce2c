//! Task assignment (user <-> task) model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `task_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskAssignment {
    pub id: DbId,
    pub task_id: DbId,
    pub user_id: DbId,
    pub assigned_at: Timestamp,
}

/// DTO for `POST /api/v1/task-assignments`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskAssignment {
    pub task_id: DbId,
    pub user_id: DbId,
}

/// Query parameters for `GET /api/v1/task-assignments`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskAssignmentListQuery {
    pub task_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
