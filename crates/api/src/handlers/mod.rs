pub mod auth;
pub mod dashboard;
pub mod invitations;
pub mod payments;
pub mod reviews;
pub mod sessions;
pub mod task_applications;
pub mod task_assignments;
pub mod task_requests;
pub mod tasks;
pub mod upload;
pub mod users;
