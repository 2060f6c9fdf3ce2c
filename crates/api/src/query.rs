//! Shared query parameter types for API handlers.

use std::str::FromStr;

use efference_core::error::CoreError;
use efference_core::pagination::{clamp_limit, clamp_skip, DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;

use crate::error::AppError;

/// Generic pagination parameters (`?skip=&limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// `(limit, skip)` clamped to the platform bounds.
    pub fn resolve(&self) -> (i64, i64) {
        page(self.limit, self.skip)
    }
}

/// Clamp raw `limit` / `skip` values taken from an entity-specific query.
pub fn page(limit: Option<i64>, skip: Option<i64>) -> (i64, i64) {
    (clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT), clamp_skip(skip))
}

/// Parse an optional status filter; an unknown value is a 400.
pub fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    raw.map(str::parse)
        .transpose()
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}
