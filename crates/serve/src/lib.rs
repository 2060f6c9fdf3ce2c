//! Dataset-serving service library.
//!
//! Lists datasets stored under a bucket prefix and hands out presigned
//! download links. Nothing here touches the platform database.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
