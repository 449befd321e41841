// Stripe Checkout client and webhook verification

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;

use super::{
    BookingMetadata, CheckoutSessionRequest, CompletedCheckout, CreatedSession, PaymentError,
    PaymentGateway, WebhookEvent,
};
use crate::config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook delivery, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const COMPLETED_EVENT: &str = "checkout.session.completed";

/// Stripe Checkout gateway
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: Option<String>,
    api_base: String,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        Ok(Self {
            http: crate::http_client::build_client()?,
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("customer_email".to_string(), request.customer_email.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                request.product_description.clone(),
            ),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];
        form.extend(
            request
                .metadata
                .to_pairs()
                .into_iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value)),
        );
        form
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
    #[serde(default)]
    amount_total: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&Self::session_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let url = session.url.ok_or(PaymentError::MissingUrl)?;
        tracing::info!("Created Stripe checkout session {}", session.id);
        Ok(CreatedSession {
            id: session.id,
            url,
        })
    }

    fn parse_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, PaymentError> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(PaymentError::WebhookNotConfigured)?;
        verify_signature(secret, payload, signature, chrono::Utc::now().timestamp())?;
        parse_event(payload)
    }
}

/// Check a `Stripe-Signature` header (`t=...,v1=...`) against the payload
///
/// Accepts when any `v1` entry matches and the timestamp is within
/// [`SIGNATURE_TOLERANCE_SECS`] of `now`.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".to_string()))?;
    if candidates.is_empty() {
        return Err(PaymentError::InvalidSignature("missing v1 signature".to_string()));
    }
    let within_tolerance = now
        .checked_sub(timestamp)
        .is_some_and(|age| age.unsigned_abs() <= SIGNATURE_TOLERANCE_SECS as u64);
    if !within_tolerance {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mac = signed_payload_mac(secret, timestamp, payload)?;
    let matched = candidates.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature("no matching signature".to_string()))
    }
}

/// Build a `Stripe-Signature` header value for a payload
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, PaymentError> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Decode a verified event body
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
    let event: EventEnvelope = serde_json::from_slice(payload)?;
    if event.kind != COMPLETED_EVENT {
        return Ok(WebhookEvent::Ignored { kind: event.kind });
    }

    let session: SessionObject = serde_json::from_value(event.data.object)?;
    let customer_email = session
        .customer_email
        .or_else(|| session.customer_details.and_then(|d| d.email))
        .filter(|email| !email.trim().is_empty());

    Ok(WebhookEvent::CheckoutCompleted(CompletedCheckout {
        session_id: session.id,
        metadata: BookingMetadata::from_map(&session.metadata.unwrap_or_default()),
        customer_email,
        amount_total_cents: session.amount_total,
    }))
}
