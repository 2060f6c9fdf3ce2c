use std::sync::Arc;

use efference_cloud::ObjectStore;
use efference_events::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: efference_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upload bucket.
    pub store: Arc<dyn ObjectStore>,
    /// Outbound email; `None` when SMTP is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}
