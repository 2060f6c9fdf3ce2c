//! Repositories for the `task_requests` and `task_applications` tables.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::status::{TaskApplicationStatus, TaskRequestStatus};
use crate::models::task_request::{
    ApprovalOutcome, ApprovedApplication, CreateTaskRequest, TaskApplication, TaskRequest,
};

const REQUEST_COLUMNS: &str =
    "id, client_id, title, description, status, task_id, created_at, updated_at";

const APPLICATION_COLUMNS: &str =
    "id, request_id, worker_id, message, status, decided_by_id, decided_at, created_at";

// ---------------------------------------------------------------------------
// Task requests
// ---------------------------------------------------------------------------

/// Provides CRUD operations for client task requests.
pub struct TaskRequestRepo;

impl TaskRequestRepo {
    /// Insert a new `open` request owned by `client_id`.
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        input: &CreateTaskRequest,
    ) -> Result<TaskRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_requests (client_id, title, description)
             VALUES ($1, $2, $3)
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, TaskRequest>(&query)
            .bind(client_id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TaskRequest>, sqlx::Error> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM task_requests WHERE id = $1");
        sqlx::query_as::<_, TaskRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests, newest first. `client_id` restricts to one client.
    pub async fn list(
        pool: &PgPool,
        client_id: Option<DbId>,
        status: Option<TaskRequestStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<TaskRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM task_requests
             WHERE ($1::UUID IS NULL OR client_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TaskRequest>(&query)
            .bind(client_id)
            .bind(status.map(TaskRequestStatus::as_str))
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Update title, description and/or status.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<TaskRequestStatus>,
    ) -> Result<Option<TaskRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE task_requests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, TaskRequest>(&query)
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(status.map(TaskRequestStatus::as_str))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Task applications
// ---------------------------------------------------------------------------

/// Provides operations for worker applications, including approval.
pub struct TaskApplicationRepo;

impl TaskApplicationRepo {
    /// Insert a `pending` application.
    ///
    /// A second application by the same worker violates
    /// `uq_task_applications_request_worker`.
    pub async fn create(
        pool: &PgPool,
        request_id: DbId,
        worker_id: DbId,
        message: Option<&str>,
    ) -> Result<TaskApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_applications (request_id, worker_id, message)
             VALUES ($1, $2, $3)
             RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as::<_, TaskApplication>(&query)
            .bind(request_id)
            .bind(worker_id)
            .bind(message)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskApplication>, sqlx::Error> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM task_applications WHERE id = $1");
        sqlx::query_as::<_, TaskApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the worker already applied to the request.
    pub async fn exists(
        pool: &PgPool,
        request_id: DbId,
        worker_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM task_applications WHERE request_id = $1 AND worker_id = $2
             )",
        )
        .bind(request_id)
        .bind(worker_id)
        .fetch_one(pool)
        .await
    }

    /// List applications, newest first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        request_id: Option<DbId>,
        worker_id: Option<DbId>,
        status: Option<TaskApplicationStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<TaskApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM task_applications
             WHERE ($1::UUID IS NULL OR request_id = $1)
               AND ($2::UUID IS NULL OR worker_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, TaskApplication>(&query)
            .bind(request_id)
            .bind(worker_id)
            .bind(status.map(TaskApplicationStatus::as_str))
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Reject a pending application. Returns `None` if it was not pending.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        decided_by_id: DbId,
    ) -> Result<Option<TaskApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE task_applications SET
                status = 'rejected', decided_by_id = $2, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as::<_, TaskApplication>(&query)
            .bind(id)
            .bind(decided_by_id)
            .fetch_optional(pool)
            .await
    }

    /// Reject every pending application of a request. Returns how many
    /// were rejected.
    pub async fn reject_pending_for_request(
        pool: &PgPool,
        request_id: DbId,
        decided_by_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE task_applications SET
                status = 'rejected', decided_by_id = $2, decided_at = NOW()
             WHERE request_id = $1 AND status = 'pending'",
        )
        .bind(request_id)
        .bind(decided_by_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_applications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approve a pending application in one transaction.
    ///
    /// Creates a task from the request (unless one already exists), assigns
    /// the worker, marks the application `approved`, the request
    /// `fulfilled`, and rejects every other pending application of the same
    /// request. Nothing is written unless the application is pending and its
    /// request is still `open`.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        decided_by_id: DbId,
    ) -> Result<ApprovalOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM task_applications
             WHERE id = $1 AND status = 'pending'
             FOR UPDATE"
        );
        let Some(pending) = sqlx::query_as::<_, TaskApplication>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(ApprovalOutcome::NotPending);
        };

        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM task_requests
             WHERE id = $1 AND status = 'open'
             FOR UPDATE"
        );
        let Some(request) = sqlx::query_as::<_, TaskRequest>(&query)
            .bind(pending.request_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(ApprovalOutcome::RequestNotOpen);
        };

        let task_id: DbId = match request.task_id {
            Some(task_id) => task_id,
            None => {
                sqlx::query_scalar(
                    "INSERT INTO tasks (title, description, created_by_id)
                     VALUES ($1, $2, $3)
                     RETURNING id",
                )
                .bind(&request.title)
                .bind(&request.description)
                .bind(decided_by_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let query = format!(
            "UPDATE task_requests SET status = 'fulfilled', task_id = $2
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, TaskRequest>(&query)
            .bind(request.id)
            .bind(task_id)
            .fetch_one(&mut *tx)
            .await?;

        let assignment_id: DbId = sqlx::query_scalar(
            "INSERT INTO task_assignments (task_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (task_id, user_id) DO UPDATE SET assigned_at = task_assignments.assigned_at
             RETURNING id",
        )
        .bind(task_id)
        .bind(pending.worker_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE task_applications SET
                status = 'approved', decided_by_id = $2, decided_at = NOW()
             WHERE id = $1
             RETURNING {APPLICATION_COLUMNS}"
        );
        let application = sqlx::query_as::<_, TaskApplication>(&query)
            .bind(id)
            .bind(decided_by_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE task_applications SET
                status = 'rejected', decided_by_id = $3, decided_at = NOW()
             WHERE request_id = $1 AND id <> $2 AND status = 'pending'",
        )
        .bind(request.id)
        .bind(id)
        .bind(decided_by_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            application_id = %id,
            task_id = %task_id,
            "Task application approved",
        );

        Ok(ApprovalOutcome::Approved(ApprovedApplication {
            application,
            request,
            task_id,
            assignment_id,
        }))
    }
}
