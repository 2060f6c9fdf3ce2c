//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod invitation_repo;
pub mod processing_job_repo;
pub mod raw_clip_repo;
pub mod review_repo;
pub mod task_assignment_repo;
pub mod task_repo;
pub mod task_request_repo;
pub mod user_repo;
pub mod video_session_repo;

pub use dashboard_repo::DashboardRepo;
pub use invitation_repo::InvitationRepo;
pub use processing_job_repo::ProcessingJobRepo;
pub use raw_clip_repo::RawClipRepo;
pub use review_repo::ReviewRepo;
pub use task_assignment_repo::TaskAssignmentRepo;
pub use task_repo::TaskRepo;
pub use task_request_repo::{TaskApplicationRepo, TaskRequestRepo};
pub use user_repo::UserRepo;
pub use video_session_repo::VideoSessionRepo;
