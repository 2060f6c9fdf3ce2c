//! Router for the dataset service.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServeConfig;
use crate::handlers::{datasets, downloads, service};
use crate::state::ServeState;

/// Build the service [`Router`].
///
/// ```text
/// GET  /                          -> service::root
/// GET  /health                    -> service::health
/// GET  /datasets                  -> datasets::list_datasets
/// GET  /datasets/{name}           -> datasets::get_dataset
/// POST /downloads/presigned-url   -> downloads::presigned_url
/// ```
pub fn build_router(state: ServeState, config: &ServeConfig) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", get(service::root))
        .route("/health", get(service::health))
        .route("/datasets", get(datasets::list_datasets))
        .route("/datasets/{name}", get(datasets::get_dataset))
        .route("/downloads/presigned-url", post(downloads::presigned_url))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Panics at startup if any configured origin is invalid.
fn build_cors_layer(config: &ServeConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
