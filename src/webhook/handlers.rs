// HTTP handler for payment provider webhooks

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the provider's payload signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receive a payment provider event
/// POST /api/webhooks/stripe
#[utoipa::path(
    post,
    path = "/api/webhooks/stripe",
    request_body(content = String, description = "Raw signed event payload", content_type = "application/json"),
    params(
        ("Stripe-Signature" = String, Header, description = "Payload signature")
    ),
    responses(
        (status = 200, description = "Event received"),
        (status = 400, description = "Missing or invalid signature, or malformed payload"),
        (status = 500, description = "Webhook not configured")
    ),
    tag = "webhooks"
)]
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state.webhooks.handle(&body, signature).await?;
    tracing::debug!("Webhook processed: {:?}", outcome);
    Ok(Json(json!({ "received": true })))
}
