//! Admin dashboard handlers.

use axum::extract::State;
use axum::Json;
use efference_db::models::dashboard::DashboardStatistics;
use efference_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/statistics
pub async fn statistics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<DashboardStatistics>>> {
    let stats = DashboardRepo::statistics(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
