//! Presigned upload endpoints (`/upload`).
//!
//! Clients upload clip bytes straight to object storage. The API hands out
//! presigned URLs, then records the clip and advances the session once the
//! client reports completion. Every endpoint requires the session creator
//! or an admin.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use efference_cloud::UploadedPart;
use efference_core::error::CoreError;
use efference_core::types::DbId;
use efference_core::upload::{
    key_belongs_to_session, multipart_object_key, part_object_key, plan_multipart,
    session_id_from_key, validate_part_number,
};
use efference_db::models::raw_clip::{CreateRawClip, RawClip};
use efference_db::models::status::VideoSessionStatus;
use efference_db::models::video_session::VideoSession;
use efference_db::repositories::RawClipRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::sessions::{advance_session, find_session};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PresignedUrlRequest {
    pub session_id: DbId,
    pub filename: String,
    pub content_type: String,
    pub part_number: i32,
}

#[derive(Debug, Serialize)]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub s3_key: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct CompleteUploadRequest {
    pub session_id: DbId,
    pub part_number: i32,
    pub s3_key: String,
    pub filesize_bytes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompleteUploadResponse {
    pub message: String,
    pub clip: RawClip,
}

#[derive(Debug, Deserialize)]
pub struct InitiateMultipartRequest {
    pub session_id: DbId,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
}

#[derive(Debug, Serialize)]
pub struct InitiateMultipartResponse {
    pub upload_id: String,
    pub s3_key: String,
    pub part_size: i64,
    pub total_parts: i64,
}

#[derive(Debug, Deserialize)]
pub struct PartUrlRequest {
    pub upload_id: String,
    pub s3_key: String,
    pub part_number: i32,
}

#[derive(Debug, Serialize)]
pub struct PartUrlResponse {
    pub presigned_url: String,
    pub part_number: i32,
}

#[derive(Debug, Deserialize)]
pub struct CompletedPart {
    pub part_number: i32,
    pub etag: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteMultipartRequest {
    pub session_id: DbId,
    pub upload_id: String,
    pub s3_key: String,
    pub parts: Vec<CompletedPart>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompleteMultipartResponse {
    pub message: String,
    pub s3_key: String,
    pub location: Option<String>,
    pub etag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AbortMultipartRequest {
    pub upload_id: String,
    pub s3_key: String,
}

// ---------------------------------------------------------------------------
// Single-part uploads
// ---------------------------------------------------------------------------

/// POST /api/v1/upload/presigned-url
pub async fn presigned_url(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<PresignedUrlRequest>,
) -> AppResult<Json<DataResponse<PresignedUrlResponse>>> {
    validate_part_number(input.part_number).map_err(validation)?;
    owned_session(&state, &auth, input.session_id).await?;

    let s3_key = part_object_key(input.session_id, input.part_number, &input.filename);
    let metadata = [
        ("session-id", input.session_id.to_string()),
        ("part-number", input.part_number.to_string()),
        ("original-filename", input.filename.clone()),
    ];
    let expires_in = state.config.upload_url_expiry_secs;
    let upload_url = state
        .store
        .presign_put(
            &s3_key,
            &input.content_type,
            &metadata,
            Duration::from_secs(expires_in),
        )
        .await?;

    tracing::info!(session_id = %input.session_id, s3_key = %s3_key, "Issued presigned upload URL");
    Ok(Json(DataResponse {
        data: PresignedUrlResponse {
            upload_url,
            s3_key,
            expires_in,
        },
    }))
}

/// POST /api/v1/upload/complete
pub async fn complete_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CompleteUploadRequest>,
) -> AppResult<Json<DataResponse<CompleteUploadResponse>>> {
    validate_part_number(input.part_number).map_err(validation)?;
    let session = owned_session(&state, &auth, input.session_id).await?;
    ensure_key_in_session(&input.s3_key, session.id)?;

    let clip = record_clip(
        &state,
        &session,
        input.s3_key,
        input.part_number,
        input.filesize_bytes,
    )
    .await?;

    Ok(Json(DataResponse {
        data: CompleteUploadResponse {
            message: "Upload completed successfully".into(),
            clip,
        },
    }))
}

// ---------------------------------------------------------------------------
// Multipart uploads
// ---------------------------------------------------------------------------

/// POST /api/v1/upload/multipart/initiate
pub async fn initiate_multipart(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<InitiateMultipartRequest>,
) -> AppResult<Json<DataResponse<InitiateMultipartResponse>>> {
    let plan = plan_multipart(input.file_size).map_err(validation)?;
    owned_session(&state, &auth, input.session_id).await?;

    let s3_key = multipart_object_key(input.session_id, &input.filename);
    let upload_id = state
        .store
        .create_multipart(&s3_key, &input.content_type)
        .await?;

    tracing::info!(
        session_id = %input.session_id,
        s3_key = %s3_key,
        total_parts = plan.total_parts,
        "Multipart upload initiated",
    );
    Ok(Json(DataResponse {
        data: InitiateMultipartResponse {
            upload_id,
            s3_key,
            part_size: plan.part_size,
            total_parts: plan.total_parts,
        },
    }))
}

/// POST /api/v1/upload/multipart/part-url
pub async fn multipart_part_url(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<PartUrlRequest>,
) -> AppResult<Json<DataResponse<PartUrlResponse>>> {
    validate_part_number(input.part_number).map_err(validation)?;
    owned_session_for_key(&state, &auth, &input.s3_key).await?;

    let presigned_url = state
        .store
        .presign_upload_part(
            &input.s3_key,
            &input.upload_id,
            input.part_number,
            Duration::from_secs(state.config.upload_url_expiry_secs),
        )
        .await?;

    Ok(Json(DataResponse {
        data: PartUrlResponse {
            presigned_url,
            part_number: input.part_number,
        },
    }))
}

/// POST /api/v1/upload/multipart/complete
pub async fn complete_multipart(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CompleteMultipartRequest>,
) -> AppResult<Json<DataResponse<CompleteMultipartResponse>>> {
    if input.parts.is_empty() {
        return Err(AppError::BadRequest("parts must not be empty".into()));
    }
    for part in &input.parts {
        validate_part_number(part.part_number).map_err(validation)?;
    }
    let session = owned_session(&state, &auth, input.session_id).await?;
    ensure_key_in_session(&input.s3_key, session.id)?;

    let parts: Vec<UploadedPart> = input
        .parts
        .into_iter()
        .map(|p| UploadedPart {
            part_number: p.part_number,
            etag: p.etag,
        })
        .collect();
    let completed = state
        .store
        .complete_multipart(&input.s3_key, &input.upload_id, &parts)
        .await?;

    record_clip(&state, &session, input.s3_key.clone(), 1, input.file_size).await?;

    Ok(Json(DataResponse {
        data: CompleteMultipartResponse {
            message: "Multipart upload completed successfully".into(),
            s3_key: input.s3_key,
            location: completed.location,
            etag: completed.etag,
        },
    }))
}

/// POST or DELETE /api/v1/upload/multipart/abort
pub async fn abort_multipart(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AbortMultipartRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    owned_session_for_key(&state, &auth, &input.s3_key).await?;
    state
        .store
        .abort_multipart(&input.s3_key, &input.upload_id)
        .await?;

    tracing::info!(s3_key = %input.s3_key, "Multipart upload aborted");
    Ok(Json(DataResponse {
        data: MessageResponse::new("Multipart upload aborted"),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert the clip row and move an uploading session on to processing.
async fn record_clip(
    state: &AppState,
    session: &VideoSession,
    s3_key: String,
    part_number: i32,
    filesize_bytes: Option<i64>,
) -> AppResult<RawClip> {
    let clip = RawClipRepo::create(
        &state.pool,
        &CreateRawClip {
            session_id: session.id,
            s3_key,
            part_number,
            filesize_bytes,
        },
    )
    .await?;

    advance_session(
        &state.pool,
        session.id,
        VideoSessionStatus::Uploading,
        VideoSessionStatus::Processing,
    )
    .await?;

    tracing::info!(session_id = %session.id, clip_id = %clip.id, part_number, "Upload recorded");
    Ok(clip)
}

async fn owned_session(state: &AppState, auth: &AuthUser, session_id: DbId) -> AppResult<VideoSession> {
    let session = find_session(&state.pool, session_id).await?;
    auth.ensure_self_or_admin(session.creator_id)?;
    Ok(session)
}

async fn owned_session_for_key(
    state: &AppState,
    auth: &AuthUser,
    s3_key: &str,
) -> AppResult<VideoSession> {
    let session_id = session_id_from_key(s3_key)
        .ok_or_else(|| AppError::BadRequest("s3_key is not a session upload key".into()))?;
    owned_session(state, auth, session_id).await
}

fn ensure_key_in_session(s3_key: &str, session_id: DbId) -> AppResult<()> {
    if key_belongs_to_session(s3_key, session_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "s3_key does not belong to this session".into(),
        ))
    }
}

fn validation(msg: String) -> AppError {
    AppError::Core(CoreError::Validation(msg))
}
