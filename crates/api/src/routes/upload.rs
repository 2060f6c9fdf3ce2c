//! Route definitions for the `/upload` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/upload`. All require the session creator or an admin.
///
/// ```text
/// POST /presigned-url        -> presigned_url
/// POST /complete             -> complete_upload
/// POST /multipart/initiate   -> initiate_multipart
/// POST /multipart/part-url   -> multipart_part_url
/// POST /multipart/complete   -> complete_multipart
/// POST /multipart/abort      -> abort_multipart
/// DELETE /multipart/abort    -> abort_multipart
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presigned-url", post(upload::presigned_url))
        .route("/complete", post(upload::complete_upload))
        .route("/multipart/initiate", post(upload::initiate_multipart))
        .route("/multipart/part-url", post(upload::multipart_part_url))
        .route("/multipart/complete", post(upload::complete_multipart))
        .route(
            "/multipart/abort",
            post(upload::abort_multipart).delete(upload::abort_multipart),
        )
}
