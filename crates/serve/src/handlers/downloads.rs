//! Presigned download links.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use efference_core::datasets::{download_key, validate_file_path};
use efference_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{ServeError, ServeResult};
use crate::state::ServeState;

pub const MIN_EXPIRES_IN_SECS: u64 = 60;
/// Longest lifetime S3 accepts for a presigned URL (7 days).
pub const MAX_EXPIRES_IN_SECS: u64 = 604_800;

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub file_path: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub url: String,
    pub expires_at: Timestamp,
    pub file_path: String,
}

/// POST /downloads/presigned-url
///
/// With a CloudFront signer configured the link is a signed CDN URL;
/// otherwise it is a presigned `GET` against the bucket. Either way it stops
/// working at `expires_at`.
pub async fn presigned_url(
    State(state): State<ServeState>,
    Json(input): Json<DownloadRequest>,
) -> ServeResult<Json<DownloadResponse>> {
    validate_file_path(&input.file_path).map_err(ServeError::BadRequest)?;
    let expires_in = input
        .expires_in
        .unwrap_or(state.config.presigned_url_expiry_secs);
    if !(MIN_EXPIRES_IN_SECS..=MAX_EXPIRES_IN_SECS).contains(&expires_in) {
        return Err(ServeError::BadRequest(format!(
            "expires_in must be between {MIN_EXPIRES_IN_SECS} and {MAX_EXPIRES_IN_SECS} seconds"
        )));
    }

    let key = download_key(&state.config.dataset_prefix, &input.file_path);
    let expires_at = Utc::now() + chrono::Duration::seconds(expires_in as i64);
    let url = match (
        state.cloudfront.as_deref(),
        state.config.cloudfront_domain.as_deref(),
    ) {
        (Some(signer), Some(domain)) => {
            signer.sign_url(&format!("https://{domain}/{key}"), expires_at)?
        }
        _ => {
            state
                .store
                .presign_get(&key, Duration::from_secs(expires_in))
                .await?
        }
    };

    tracing::info!(key = %key, expires_in, "Issued download URL");
    Ok(Json(DownloadResponse {
        url,
        expires_at,
        file_path: input.file_path,
    }))
}
