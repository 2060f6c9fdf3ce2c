//! Aggregate queries backing the admin dashboard.

use std::collections::BTreeMap;

use efference_core::roles::VALID_ROLES;
use sqlx::PgPool;

use crate::models::dashboard::DashboardStatistics;
use crate::models::status::VideoSessionStatus;

/// Read-only aggregate queries.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Platform-wide totals with per-status and per-role breakdowns.
    pub async fn statistics(pool: &PgPool) -> Result<DashboardStatistics, sqlx::Error> {
        let (total_users, total_tasks, total_video_sessions, total_reviews): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM tasks),
                    (SELECT COUNT(*) FROM video_sessions),
                    (SELECT COUNT(*) FROM reviews)",
            )
            .fetch_one(pool)
            .await?;

        let mut sessions_by_status: BTreeMap<String, i64> = VideoSessionStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM video_sessions GROUP BY status")
                .fetch_all(pool)
                .await?;
        sessions_by_status.extend(rows);

        let mut users_by_role: BTreeMap<String, i64> =
            VALID_ROLES.iter().map(|r| (r.to_string(), 0)).collect();
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(pool)
                .await?;
        users_by_role.extend(rows);

        Ok(DashboardStatistics {
            total_users,
            total_tasks,
            total_video_sessions,
            total_reviews,
            sessions_by_status,
            users_by_role,
        })
    }
}
