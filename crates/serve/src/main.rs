use std::net::SocketAddr;
use std::sync::Arc;

use efference_cloud::{ObjectStore, S3Config, S3ObjectStore};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use efference_serve::config::ServeConfig;
use efference_serve::router::build_router;
use efference_serve::state::{load_cloudfront_signer, ServeState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "efference_serve=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServeConfig::from_env();
    tracing::info!(
        bucket = %config.bucket,
        prefix = %config.dataset_prefix,
        "Loaded dataset service configuration",
    );

    // --- Object storage ---
    let s3_config = S3Config::for_bucket(config.bucket.clone());
    let store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::connect(&s3_config).await);

    let cloudfront = load_cloudfront_signer(&config).map(Arc::new);
    if let Some(signer) = &cloudfront {
        tracing::info!(key_pair_id = %signer.key_pair_id(), "CloudFront signed URLs enabled");
    }

    let state = ServeState {
        config: Arc::new(config.clone()),
        store,
        cloudfront,
    };
    let app = build_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting dataset service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
