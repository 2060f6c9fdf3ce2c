//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod dashboard;
pub mod invitation;
pub mod processing_job;
pub mod raw_clip;
pub mod review;
pub mod status;
pub mod task;
pub mod task_assignment;
pub mod task_request;
pub mod user;
pub mod video_session;
