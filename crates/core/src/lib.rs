//! Shared domain types and pure business rules for the Efference platform.
//!
//! Nothing in this crate performs I/O; the database, storage and HTTP
//! crates all build on these definitions.

pub mod datasets;
pub mod error;
pub mod invitation;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod upload;
pub mod webhook;
