//! Route definitions for client task requests and worker applications.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{task_applications, task_requests};
use crate::state::AppState;

/// Routes mounted at `/task-requests`.
///
/// ```text
/// GET    /                    -> list_requests
/// POST   /                    -> create_request (client or admin)
/// GET    /{id}                -> get_request
/// PUT    /{id}                -> update_request (owner or admin)
/// DELETE /{id}                -> delete_request (owner or admin)
/// GET    /{id}/applications   -> list_request_applications (owner or admin)
/// POST   /{id}/applications   -> apply (trainer or worker)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(task_requests::list_requests).post(task_requests::create_request),
        )
        .route(
            "/{id}",
            get(task_requests::get_request)
                .put(task_requests::update_request)
                .delete(task_requests::delete_request),
        )
        .route(
            "/{id}/applications",
            get(task_requests::list_request_applications).post(task_requests::apply),
        )
}

/// Routes mounted at `/task-applications`.
///
/// ```text
/// GET    /              -> list_applications
/// DELETE /{id}          -> delete_application (applicant or admin)
/// POST   /{id}/approve  -> approve_application (admin)
/// POST   /{id}/reject   -> reject_application (admin)
/// ```
pub fn applications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(task_applications::list_applications))
        .route("/{id}", delete(task_applications::delete_application))
        .route("/{id}/approve", post(task_applications::approve_application))
        .route("/{id}/reject", post(task_applications::reject_application))
}
