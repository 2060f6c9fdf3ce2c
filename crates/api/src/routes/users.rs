//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                   -> list_users (admin)
/// POST   /                   -> create_user (admin)
/// GET    /me/role            -> my_role
/// GET    /email/{email}      -> get_user_by_email (admin)
/// GET    /{id}               -> get_user (self or admin)
/// PUT    /{id}               -> update_user (self or admin)
/// DELETE /{id}               -> delete_user (admin)
/// PUT    /{id}/password      -> set_password (self or admin)
/// GET    /{id}/statistics    -> user_statistics (self or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/me/role", get(users::my_role))
        .route("/email/{email}", get(users::get_user_by_email))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/password", put(users::set_password))
        .route("/{id}/statistics", get(users::user_statistics))
}
