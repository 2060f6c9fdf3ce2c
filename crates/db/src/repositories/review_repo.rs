//! Repository for the `reviews` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{Review, UpdateReview};
use crate::models::status::ReviewStatus;

const COLUMNS: &str = "id, session_id, reviewer_id, status, comments, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A second review for the same session violates
    /// `uq_reviews_session`.
    pub async fn create(
        pool: &PgPool,
        session_id: DbId,
        reviewer_id: DbId,
        status: ReviewStatus,
        comments: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (session_id, reviewer_id, status, comments)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(session_id)
            .bind(reviewer_id)
            .bind(status.as_str())
            .bind(comments)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE session_id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// List reviews, newest first, optionally for one reviewer.
    pub async fn list(
        pool: &PgPool,
        reviewer_id: Option<DbId>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE ($1::UUID IS NULL OR reviewer_id = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(reviewer_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET
                status = COALESCE($2, status),
                comments = COALESCE($3, comments)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.status.map(ReviewStatus::as_str))
            .bind(&input.comments)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
