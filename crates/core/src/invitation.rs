//! Invitation code generation and expiry rules.

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

/// Length of a generated invitation code (URL-safe alphanumeric characters).
pub const CODE_LENGTH: usize = 43;

/// Expiry used when the admin does not specify one.
pub const DEFAULT_EXPIRES_IN_DAYS: i64 = 7;

pub const MIN_EXPIRES_IN_DAYS: i64 = 1;
pub const MAX_EXPIRES_IN_DAYS: i64 = 30;

/// Generate a new random invitation code.
pub fn generate_invitation_code() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Validate the requested lifetime of an invitation.
pub fn validate_expires_in_days(days: i64) -> Result<(), String> {
    if (MIN_EXPIRES_IN_DAYS..=MAX_EXPIRES_IN_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(format!(
            "expires_in_days must be between {MIN_EXPIRES_IN_DAYS} and {MAX_EXPIRES_IN_DAYS}"
        ))
    }
}

/// Compute the expiry timestamp for an invitation issued at `now`.
pub fn expiry_from(now: Timestamp, days: i64) -> Timestamp {
    now + Duration::days(days)
}

/// An invitation is expired once `now` has reached `expires_at`.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now >= expires_at
}

/// Compare an invitation email with a registration email, ignoring case
/// and surrounding whitespace.
pub fn emails_match(invited: &str, registering: &str) -> bool {
    invited.trim().eq_ignore_ascii_case(registering.trim())
}
