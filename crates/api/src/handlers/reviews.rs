//! Handlers for the `/reviews` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use efference_core::error::CoreError;
use efference_core::types::DbId;
use efference_db::models::review::{CreateReview, Review, ReviewListQuery, UpdateReview};
use efference_db::models::status::VideoSessionStatus;
use efference_db::repositories::ReviewRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::sessions::{advance_session, find_session};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireReviewer;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/reviews
///
/// The caller becomes the reviewer. A session waiting for review takes the
/// review's outcome as its new status.
pub async fn create_review(
    State(state): State<AppState>,
    RequireReviewer(reviewer): RequireReviewer,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    let session = find_session(&state.pool, input.session_id).await?;
    if ReviewRepo::find_by_session(&state.pool, session.id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "Review already exists for this session".into(),
        ));
    }

    let review = ReviewRepo::create(
        &state.pool,
        session.id,
        reviewer.user_id,
        input.status,
        input.comments.as_deref(),
    )
    .await?;

    advance_session(
        &state.pool,
        session.id,
        VideoSessionStatus::PendingReview,
        VideoSessionStatus::from(input.status),
    )
    .await?;

    tracing::info!(
        review_id = %review.id,
        session_id = %session.id,
        status = %input.status,
        reviewer_id = %reviewer.user_id,
        "Review submitted",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /api/v1/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ReviewListQuery>,
) -> AppResult<Json<DataResponse<Vec<Review>>>> {
    let (limit, skip) = page(params.limit, params.skip);
    let reviews = ReviewRepo::list(&state.pool, params.reviewer_id, limit, skip).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Review>>> {
    let review = find_review(&state, id).await?;
    Ok(Json(DataResponse { data: review }))
}

/// GET /api/v1/reviews/session/{session_id}
pub async fn get_session_review(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Review>>> {
    find_session(&state.pool, session_id).await?;
    let review = ReviewRepo::find_by_session(&state.pool, session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No review for session {session_id}")))?;
    Ok(Json(DataResponse { data: review }))
}

/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<DataResponse<Review>>> {
    let review = find_review(&state, id).await?;
    auth.ensure_self_or_admin(review.reviewer_id)?;

    let review = ReviewRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Review", id }))?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let review = find_review(&state, id).await?;
    auth.ensure_self_or_admin(review.reviewer_id)?;
    ReviewRepo::delete(&state.pool, id).await?;
    tracing::info!(review_id = %id, deleted_by = %auth.user_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_review(state: &AppState, id: DbId) -> AppResult<Review> {
    ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Review", id }))
}
