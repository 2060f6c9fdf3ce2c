//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` and
//! `invitations.role` in `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TRAINER: &str = "trainer";
pub const ROLE_WORKER: &str = "worker";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_REVIEWER: &str = "reviewer";

/// All valid role names, in display order.
pub const VALID_ROLES: &[&str] = &[
    ROLE_ADMIN,
    ROLE_TRAINER,
    ROLE_WORKER,
    ROLE_CLIENT,
    ROLE_REVIEWER,
];

/// Normalize a caller-supplied role name (`"TRAINER"` -> `"trainer"`) and
/// check it against [`VALID_ROLES`].
pub fn parse_role(role: &str) -> Result<&'static str, String> {
    let lowered = role.trim().to_ascii_lowercase();
    VALID_ROLES
        .iter()
        .copied()
        .find(|r| *r == lowered)
        .ok_or_else(|| {
            format!(
                "Invalid role '{role}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            )
        })
}

/// Roles that record video sessions and receive task assignments.
pub fn is_performer(role: &str) -> bool {
    role == ROLE_TRAINER || role == ROLE_WORKER
}
