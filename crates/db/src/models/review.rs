//! Review entity model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::ReviewStatus;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub session_id: DbId,
    pub reviewer_id: DbId,
    pub status: String,
    pub comments: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/v1/reviews`. The reviewer is the caller.
#[derive(Debug, Deserialize)]
pub struct CreateReview {
    pub session_id: DbId,
    pub status: ReviewStatus,
    pub comments: Option<String>,
}

/// DTO for updating a review. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReview {
    pub status: Option<ReviewStatus>,
    pub comments: Option<String>,
}

/// Query parameters for `GET /api/v1/reviews`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub reviewer_id: Option<DbId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
