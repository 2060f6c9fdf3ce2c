//! Repository for the `users` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserStatistics};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, email, role, password_hash, is_active, is_invited, \
                       invitation_used_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Emails are stored lowercase. Invited users get `invitation_used_at`
    /// stamped at insert time.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, is_invited, invitation_used_at)
             VALUES ($1, LOWER($2), $3, $4, $5, CASE WHEN $5 THEN NOW() ELSE NULL END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(input.email.trim())
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(input.is_invited)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Check whether a user with this email exists.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = LOWER($1))")
                .bind(email.trim())
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// List users ordered by most recently created first, optionally
    /// filtered by role.
    pub async fn list(
        pool: &PgPool,
        role: Option<&str>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR role = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.role)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Role-dependent activity counters.
    ///
    /// Only the counters meaningful for the user's role are computed; the
    /// rest are zero.
    pub async fn statistics(pool: &PgPool, user: &User) -> Result<UserStatistics, sqlx::Error> {
        let mut stats = UserStatistics {
            user_id: user.id,
            role: user.role.clone(),
            total_sessions_created: 0,
            total_reviews_submitted: 0,
            total_tasks_assigned: 0,
            total_tasks_created: 0,
        };

        if efference_core::roles::is_performer(&user.role) {
            stats.total_sessions_created =
                sqlx::query_scalar("SELECT COUNT(*) FROM video_sessions WHERE creator_id = $1")
                    .bind(user.id)
                    .fetch_one(pool)
                    .await?;
            stats.total_tasks_assigned =
                sqlx::query_scalar("SELECT COUNT(*) FROM task_assignments WHERE user_id = $1")
                    .bind(user.id)
                    .fetch_one(pool)
                    .await?;
        }

        if user.role == efference_core::roles::ROLE_REVIEWER {
            stats.total_reviews_submitted =
                sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE reviewer_id = $1")
                    .bind(user.id)
                    .fetch_one(pool)
                    .await?;
        }

        if user.role == efference_core::roles::ROLE_ADMIN {
            stats.total_tasks_created =
                sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE created_by_id = $1")
                    .bind(user.id)
                    .fetch_one(pool)
                    .await?;
        }

        Ok(stats)
    }
}
