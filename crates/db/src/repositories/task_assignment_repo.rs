//! Repository for the `task_assignments` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::task_assignment::TaskAssignment;

const COLUMNS: &str = "id, task_id, user_id, assigned_at";

/// Provides CRUD operations for task assignments.
pub struct TaskAssignmentRepo;

impl TaskAssignmentRepo {
    /// Assign `user_id` to `task_id`.
    ///
    /// A duplicate pair violates `uq_task_assignments_task_user`.
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        user_id: DbId,
    ) -> Result<TaskAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_assignments (task_id, user_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskAssignment>(&query)
            .bind(task_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskAssignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_assignments WHERE id = $1");
        sqlx::query_as::<_, TaskAssignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user is already assigned to the task.
    pub async fn exists(pool: &PgPool, task_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM task_assignments WHERE task_id = $1 AND user_id = $2)",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// List assignments, newest first, with optional task/user filters.
    pub async fn list(
        pool: &PgPool,
        task_id: Option<DbId>,
        user_id: Option<DbId>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<TaskAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_assignments
             WHERE ($1::UUID IS NULL OR task_id = $1)
               AND ($2::UUID IS NULL OR user_id = $2)
             ORDER BY assigned_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TaskAssignment>(&query)
            .bind(task_id)
            .bind(user_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
