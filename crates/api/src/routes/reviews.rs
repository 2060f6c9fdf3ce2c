//! Route definitions for the `/reviews` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /                       -> list_reviews
/// POST   /                       -> create_review (reviewer or admin)
/// GET    /session/{session_id}   -> get_session_review
/// GET    /{id}                   -> get_review
/// PUT    /{id}                   -> update_review (author or admin)
/// DELETE /{id}                   -> delete_review (author or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list_reviews).post(reviews::create_review))
        .route("/session/{session_id}", get(reviews::get_session_review))
        .route(
            "/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
}
