//! Invitation entity model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub code: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub invited_by_id: Option<DbId>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub used_at: Option<Timestamp>,
}

/// DTO for inserting an invitation. Code and expiry are computed by the caller.
#[derive(Debug)]
pub struct CreateInvitation {
    pub code: String,
    pub email: String,
    pub role: String,
    pub invited_by_id: Option<DbId>,
    pub expires_at: Timestamp,
}

/// Query parameters for `GET /api/v1/invitations`.
#[derive(Debug, Default, Deserialize)]
pub struct InvitationListQuery {
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
