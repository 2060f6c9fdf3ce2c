use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST /webhook  -> webhook (public, signature-verified)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(payments::webhook))
}
