//! Payment provider webhook (`POST /payments/webhook`).
//!
//! The body must be read raw: the signature covers the exact bytes sent,
//! so it is verified before any JSON parsing.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use efference_core::webhook::{verify_signature, DEFAULT_TOLERANCE_SECS};
use efference_events::templates::{display_name, format_amount, preorder_confirmation_email};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Envelope of every webhook delivery.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

/// The fields of a checkout session the confirmation email needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CheckoutSession {
    id: Option<String>,
    payment_status: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    amount_total: Option<i64>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomerDetails {
    email: Option<String>,
    name: Option<String>,
}

/// Bare acknowledgement returned to the provider.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// POST /api/v1/payments/webhook
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or_else(|| AppError::InternalError("Webhook secret is not configured".into()))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    verify_signature(
        &body,
        signature,
        secret,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook delivery");
        AppError::BadRequest(format!("Invalid signature: {e}"))
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid payload: {e}")))?;

    tracing::info!(
        event_id = event.id.as_deref().unwrap_or("-"),
        event_type = %event.event_type,
        "Webhook received",
    );

    match event.event_type.as_str() {
        CHECKOUT_COMPLETED => {
            let session: CheckoutSession = serde_json::from_value(event.data.object)
                .map_err(|e| AppError::BadRequest(format!("Invalid checkout session: {e}")))?;
            if session.payment_status.as_deref() != Some("paid") {
                return Ok(Json(WebhookAck {
                    status: "payment_not_completed",
                }));
            }
            send_confirmation(&state, &session).await;
        }
        PAYMENT_FAILED => {
            let intent_id = event
                .data
                .object
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("-");
            tracing::warn!(payment_intent = intent_id, "Payment failed");
        }
        _ => {}
    }

    Ok(Json(WebhookAck { status: "success" }))
}

/// Email the pre-order confirmation. Failures are logged; the provider
/// must still see the delivery acknowledged.
async fn send_confirmation(state: &AppState, session: &CheckoutSession) {
    let details = session.customer_details.as_ref();
    let Some(email) = details
        .and_then(|d| d.email.as_deref())
        .or(session.customer_email.as_deref())
    else {
        tracing::warn!(checkout_session = ?session.id, "Paid checkout has no customer email");
        return;
    };

    let Some(mailer) = state.mailer.as_ref() else {
        tracing::warn!(checkout_session = ?session.id, "Email delivery is not configured; skipping confirmation");
        return;
    };

    let name = display_name(details.and_then(|d| d.name.as_deref()), email);
    let amount = format_amount(
        session.amount_total.unwrap_or(0),
        session.currency.as_deref().unwrap_or("usd"),
    );

    match mailer
        .send(preorder_confirmation_email(email, name, &amount))
        .await
    {
        Ok(()) => tracing::info!(checkout_session = ?session.id, "Pre-order confirmation sent"),
        Err(e) => {
            tracing::error!(error = %e, checkout_session = ?session.id, "Failed to send pre-order confirmation")
        }
    }
}
