//! Raw clip (one uploaded part of a session) model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `raw_clips` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RawClip {
    pub id: DbId,
    pub session_id: DbId,
    pub s3_key: String,
    pub part_number: i32,
    pub filesize_bytes: Option<i64>,
    pub upload_completed_at: Timestamp,
}

/// DTO for creating a clip record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRawClip {
    pub session_id: DbId,
    #[validate(length(min = 1, max = 1024))]
    pub s3_key: String,
    #[validate(range(min = 1, max = 10000))]
    pub part_number: i32,
    #[validate(range(min = 0))]
    pub filesize_bytes: Option<i64>,
}

/// DTO for updating a clip. All fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRawClip {
    #[validate(length(min = 1, max = 1024))]
    pub s3_key: Option<String>,
    #[validate(range(min = 0))]
    pub filesize_bytes: Option<i64>,
}
