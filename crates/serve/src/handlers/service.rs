//! Service identification and liveness.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::ServeState;

pub const SERVICE_NAME: &str = "Efference Dataset Serve";

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bucket: String,
}

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

/// GET /health
pub async fn health(State(state): State<ServeState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        bucket: state.config.bucket.clone(),
    })
}
