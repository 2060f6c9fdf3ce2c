//! Repository for the `raw_clips` table.

use efference_core::types::DbId;
use sqlx::PgPool;

use crate::models::raw_clip::{CreateRawClip, RawClip, UpdateRawClip};

const COLUMNS: &str = "id, session_id, s3_key, part_number, filesize_bytes, upload_completed_at";

/// Provides CRUD operations for uploaded clip parts.
pub struct RawClipRepo;

impl RawClipRepo {
    /// Record an uploaded part.
    ///
    /// A second clip with the same `(session_id, part_number)` violates
    /// `uq_raw_clips_session_part`.
    pub async fn create(pool: &PgPool, input: &CreateRawClip) -> Result<RawClip, sqlx::Error> {
        let query = format!(
            "INSERT INTO raw_clips (session_id, s3_key, part_number, filesize_bytes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawClip>(&query)
            .bind(input.session_id)
            .bind(&input.s3_key)
            .bind(input.part_number)
            .bind(input.filesize_bytes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RawClip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM raw_clips WHERE id = $1");
        sqlx::query_as::<_, RawClip>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All clips of a session ordered by part number.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<RawClip>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM raw_clips WHERE session_id = $1 ORDER BY part_number ASC"
        );
        sqlx::query_as::<_, RawClip>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRawClip,
    ) -> Result<Option<RawClip>, sqlx::Error> {
        let query = format!(
            "UPDATE raw_clips SET
                s3_key = COALESCE($2, s3_key),
                filesize_bytes = COALESCE($3, filesize_bytes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RawClip>(&query)
            .bind(id)
            .bind(&input.s3_key)
            .bind(input.filesize_bytes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM raw_clips WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
