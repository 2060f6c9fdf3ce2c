//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireReviewer`] -- Requires `reviewer` or `admin`.
//! - [`rbac::RequireClient`] -- Requires `client` or `admin`.
//! - [`rbac::RequirePerformer`] -- Requires `trainer` or `worker`.

pub mod auth;
pub mod rbac;
