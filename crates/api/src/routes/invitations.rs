//! Route definitions for the `/invitations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invitations;
use crate::state::AppState;

/// Routes mounted at `/invitations`. Admin-only except `validate`.
///
/// ```text
/// GET    /                  -> list_invitations
/// POST   /                  -> create_invitation
/// GET    /validate/{code}   -> validate_invitation (public)
/// GET    /{id}              -> get_invitation
/// PUT    /{id}              -> update_invitation
/// DELETE /{id}              -> delete_invitation
/// POST   /{id}/send         -> send_invitation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route("/validate/{code}", get(invitations::validate_invitation))
        .route(
            "/{id}",
            get(invitations::get_invitation)
                .put(invitations::update_invitation)
                .delete(invitations::delete_invitation),
        )
        .route("/{id}/send", post(invitations::send_invitation))
}
