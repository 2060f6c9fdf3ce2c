//! User entity model and DTOs.

use efference_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_invited: bool,
    pub invitation_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub is_invited: bool,
    pub invitation_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            is_invited: user.is_invited,
            invitation_used_at: user.invitation_used_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for inserting a user. The password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_invited: bool,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// Filter by role name (any case).
    pub role: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Per-user activity counters for `GET /api/v1/users/{id}/statistics`.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    pub user_id: DbId,
    pub role: String,
    pub total_sessions_created: i64,
    pub total_reviews_submitted: i64,
    pub total_tasks_assigned: i64,
    pub total_tasks_created: i64,
}
