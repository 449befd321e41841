// Payment provider integration
//
// The checkout flow only needs two things from a provider: create a hosted
// payment session, and turn a signed webhook delivery into an event.

pub mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use std::collections::HashMap;

/// Errors raised by a payment provider client
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("payment provider returned no redirect url")]
    MissingUrl,

    #[error("webhook secret is not configured")]
    WebhookNotConfigured,

    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Booking details carried through the payment session
///
/// Stored as string metadata on the session and read back by the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingMetadata {
    pub room_id: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: String,
    pub name: String,
    pub phone: String,
    pub nights: String,
}

impl BookingMetadata {
    /// Metadata as ordered key/value pairs
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("roomId", self.room_id.clone()),
            ("checkIn", self.check_in.clone()),
            ("checkOut", self.check_out.clone()),
            ("guests", self.guests.clone()),
            ("name", self.name.clone()),
            ("phone", self.phone.clone()),
            ("nights", self.nights.clone()),
        ]
    }

    /// Read metadata back, defaulting what is missing
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str, default: &str| {
            map.get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            room_id: get("roomId", ""),
            check_in: get("checkIn", ""),
            check_out: get("checkOut", ""),
            guests: get("guests", "1"),
            name: get("name", ""),
            phone: get("phone", ""),
            nights: get("nights", "0"),
        }
    }
}

/// A payment session to create
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Amount in cents, at least 1
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
    pub product_name: String,
    pub product_description: String,
    pub metadata: BookingMetadata,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created payment session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: String,
    /// Hosted payment page the guest is redirected to
    pub url: String,
}

/// A payment session that reached the completed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub metadata: BookingMetadata,
    pub customer_email: Option<String>,
    pub amount_total_cents: Option<i64>,
}

/// A verified webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    CheckoutCompleted(CompletedCheckout),
    /// Any event type the site does not act on
    Ignored { kind: String },
}

/// Hosted-checkout payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, PaymentError>;

    /// Verify a webhook signature and decode the event
    fn parse_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, PaymentError>;
}
