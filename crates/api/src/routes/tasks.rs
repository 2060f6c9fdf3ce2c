//! Route definitions for tasks and task assignments.

use axum::routing::get;
use axum::Router;

use crate::handlers::{task_assignments, tasks};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                   -> list_tasks
/// POST   /                   -> create_task (admin)
/// GET    /{id}               -> get_task
/// PUT    /{id}               -> update_task (admin)
/// DELETE /{id}               -> delete_task (admin)
/// GET    /{id}/assignments   -> list_task_assignments
/// POST   /{id}/assignments   -> assign_task (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/{id}/assignments",
            get(tasks::list_task_assignments).post(tasks::assign_task),
        )
}

/// Routes mounted at `/task-assignments`.
///
/// ```text
/// GET    /      -> list_assignments
/// POST   /      -> create_assignment (admin)
/// GET    /{id}  -> get_assignment (assignee or admin)
/// DELETE /{id}  -> delete_assignment (admin)
/// ```
pub fn assignments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(task_assignments::list_assignments).post(task_assignments::create_assignment),
        )
        .route(
            "/{id}",
            get(task_assignments::get_assignment).delete(task_assignments::delete_assignment),
        )
}
