//! Aggregate counts for the admin dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

/// Response of `GET /api/v1/dashboard/statistics`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatistics {
    pub total_users: i64,
    pub total_tasks: i64,
    pub total_video_sessions: i64,
    pub total_reviews: i64,
    /// Every session status, zero-filled.
    pub sessions_by_status: BTreeMap<String, i64>,
    /// Every role, zero-filled.
    pub users_by_role: BTreeMap<String, i64>,
}
