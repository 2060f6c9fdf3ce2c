//! Object key naming and multipart sizing for session uploads.
//!
//! Every uploaded object lives under `sessions/{session_id}/`. Single-part
//! uploads are keyed by part number; multipart uploads get one key per
//! original file.

use crate::types::DbId;

/// Smallest part size handed out for multipart uploads (100 MiB).
pub const MIN_MULTIPART_PART_SIZE: i64 = 100 * 1024 * 1024;

/// Target upper bound on the number of parts for a single file.
pub const TARGET_PART_COUNT: i64 = 1000;

/// Hard S3 limit on part numbers.
pub const MAX_PART_NUMBER: i32 = 10_000;

/// Replace characters that would break out of the session prefix.
pub fn sanitize_filename(filename: &str) -> String {
    filename.replace([' ', '/'], "_")
}

/// Key for one single-part clip: `sessions/{id}/part_{n}_{file}`.
pub fn part_object_key(session_id: DbId, part_number: i32, filename: &str) -> String {
    format!(
        "sessions/{session_id}/part_{part_number}_{}",
        sanitize_filename(filename)
    )
}

/// Key for a multipart upload: `sessions/{id}/multipart_{file}`.
pub fn multipart_object_key(session_id: DbId, filename: &str) -> String {
    format!(
        "sessions/{session_id}/multipart_{}",
        sanitize_filename(filename)
    )
}

/// Part size and count for a multipart upload of `file_size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultipartPlan {
    pub part_size: i64,
    pub total_parts: i64,
}

/// Compute the part layout for a file.
///
/// Parts are at least [`MIN_MULTIPART_PART_SIZE`] and grow with the file
/// so that very large uploads stay near [`TARGET_PART_COUNT`] parts.
pub fn plan_multipart(file_size: i64) -> Result<MultipartPlan, String> {
    if file_size <= 0 {
        return Err("file_size must be greater than zero".to_string());
    }
    let part_size = MIN_MULTIPART_PART_SIZE.max(file_size / TARGET_PART_COUNT);
    let total_parts = file_size / part_size + i64::from(file_size % part_size != 0);
    Ok(MultipartPlan {
        part_size,
        total_parts,
    })
}

/// Validate a part number supplied by a client.
pub fn validate_part_number(part_number: i32) -> Result<(), String> {
    if (1..=MAX_PART_NUMBER).contains(&part_number) {
        Ok(())
    } else {
        Err(format!(
            "part_number must be between 1 and {MAX_PART_NUMBER}, got {part_number}"
        ))
    }
}

/// Check that a key belongs to the given session's prefix.
pub fn key_belongs_to_session(key: &str, session_id: DbId) -> bool {
    key.starts_with(&format!("sessions/{session_id}/")) && !key.contains("..")
}

/// Recover the session id from a key under `sessions/{session_id}/`.
pub fn session_id_from_key(key: &str) -> Option<DbId> {
    let rest = key.strip_prefix("sessions/")?;
    let (id, tail) = rest.split_once('/')?;
    if tail.is_empty() || key.contains("..") {
        return None;
    }
    id.parse().ok()
}
