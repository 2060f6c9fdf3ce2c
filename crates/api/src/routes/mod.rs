pub mod auth;
pub mod dashboard;
pub mod health;
pub mod invitations;
pub mod payments;
pub mod reviews;
pub mod sessions;
pub mod task_requests;
pub mod tasks;
pub mod upload;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/register                               register with invitation (public)
/// /auth/me                                     current user
/// /auth/change-password                        change own password
///
/// /users                                       list, create (admin)
/// /users/me/role                               caller's role
/// /users/email/{email}                         lookup by email (admin)
/// /users/{id}                                  get, update, delete
/// /users/{id}/password                         set password
/// /users/{id}/statistics                       per-user counts
///
/// /tasks                                       list, create
/// /tasks/{id}                                  get, update, delete
/// /tasks/{id}/assignments                      list, assign
/// /task-assignments                            list, create
/// /task-assignments/{id}                       get, delete
///
/// /task-requests                               list, create
/// /task-requests/{id}                          get, update, delete
/// /task-requests/{id}/applications             list, apply
/// /task-applications                           list
/// /task-applications/{id}                      withdraw (DELETE)
/// /task-applications/{id}/approve              approve (POST)
/// /task-applications/{id}/reject               reject (POST)
///
/// /sessions                                    list, create
/// /sessions/{id}                               get, update, delete
/// /sessions/{id}/clips                         list, create
/// /sessions/clips/{clip_id}                    update, delete
/// /sessions/{id}/processing-jobs               list, create
/// /sessions/processing-jobs/{job_id}           update
///
/// /upload/presigned-url                        single-part upload URL
/// /upload/complete                             record single-part upload
/// /upload/multipart/{initiate,part-url,complete,abort}
///
/// /reviews                                     list, create
/// /reviews/session/{session_id}                review of a session
/// /reviews/{id}                                get, update, delete
///
/// /invitations                                 list, create (admin)
/// /invitations/validate/{code}                 validate code (public)
/// /invitations/{id}                            get, update, delete (admin)
/// /invitations/{id}/send                       email the invitation (admin)
///
/// /dashboard/statistics                        platform counts (admin)
///
/// /payments/webhook                            payment provider events (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tasks", tasks::router())
        .nest("/task-assignments", tasks::assignments_router())
        .nest("/task-requests", task_requests::router())
        .nest("/task-applications", task_requests::applications_router())
        .nest("/sessions", sessions::router())
        .nest("/upload", upload::router())
        .nest("/reviews", reviews::router())
        .nest("/invitations", invitations::router())
        .nest("/dashboard", dashboard::router())
        .nest("/payments", payments::router())
}
