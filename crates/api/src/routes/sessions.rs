//! Route definitions for the `/sessions` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /                            -> list_sessions
/// POST   /                            -> create_session
/// POST   /upload                      -> create_session_from_upload (caller is creator)
/// GET    /{id}                        -> get_session (with clips, jobs, review)
/// PUT    /{id}                        -> update_session (reviewer or admin)
/// DELETE /{id}                        -> delete_session (admin)
/// GET    /{id}/clips                  -> list_clips
/// POST   /{id}/clips                  -> create_clip
/// PUT    /clips/{clip_id}             -> update_clip
/// DELETE /clips/{clip_id}             -> delete_clip (admin)
/// GET    /{id}/processing-jobs        -> list_processing_jobs
/// POST   /{id}/processing-jobs        -> create_processing_job (admin)
/// PUT    /processing-jobs/{job_id}    -> update_processing_job (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/upload", post(sessions::create_session_from_upload))
        .route(
            "/{id}",
            get(sessions::get_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route(
            "/{id}/clips",
            get(sessions::list_clips).post(sessions::create_clip),
        )
        .route(
            "/clips/{clip_id}",
            put(sessions::update_clip).delete(sessions::delete_clip),
        )
        .route(
            "/{id}/processing-jobs",
            get(sessions::list_processing_jobs).post(sessions::create_processing_job),
        )
        .route(
            "/processing-jobs/{job_id}",
            put(sessions::update_processing_job),
        )
}
