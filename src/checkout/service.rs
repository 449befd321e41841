// Checkout orchestration: validate the booking form, apply the discount,
// re-check availability and open a hosted payment session

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use super::models::{CheckoutRequest, DiscountPreviewResponse};
use crate::blocked::{Availability, BlockedPeriodRepository};
use crate::discount::{DiscountEvaluator, DiscountOutcome};
use crate::error::ApiError;
use crate::payments::{BookingMetadata, CheckoutSessionRequest, CreatedSession, PaymentGateway};
use crate::rooms::RoomId;
use crate::validation::{non_blank, parse_stay};

const MSG_BOOKING_INVALID: &str = "Dati prenotazione mancanti o non validi.";
const MSG_AMOUNT_INVALID: &str = "Importo o numero di notti non validi.";
const MSG_DISCOUNT_INVALID: &str = "Codice sconto non valido o scaduto.";
const MSG_DATES_TAKEN: &str = "Le date selezionate non sono più disponibili.";
const MSG_NOT_CONFIGURED: &str = "Pagamento non configurato.";
const MSG_PROVIDER_FAILED: &str = "Errore durante la creazione del pagamento. Riprova o contattaci.";

const CURRENCY: &str = "eur";

/// Booking form after validation
#[derive(Debug, Clone, PartialEq)]
struct ValidatedBooking {
    room: RoomId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    name: String,
    email: String,
    phone: String,
    guests: u32,
    nights: f64,
    total: Decimal,
}

/// Checkout orchestrator
#[derive(Clone)]
pub struct CheckoutService {
    blocked: BlockedPeriodRepository,
    discounts: DiscountEvaluator,
    gateway: Option<Arc<dyn PaymentGateway>>,
    public_base_url: Option<String>,
}

impl CheckoutService {
    pub fn new(
        blocked: BlockedPeriodRepository,
        discounts: DiscountEvaluator,
        gateway: Option<Arc<dyn PaymentGateway>>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            blocked,
            discounts,
            gateway,
            public_base_url,
        }
    }

    /// Create a payment session for a booking and return it
    ///
    /// Checks run in order and the first failure is returned: booking fields,
    /// amount and nights, discount code, then availability. A storage outage
    /// during the availability check does not block the payment.
    pub async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CreatedSession, ApiError> {
        let (gateway, base_url) = match (&self.gateway, &self.public_base_url) {
            (Some(gateway), Some(base_url)) => (gateway, base_url),
            _ => {
                tracing::warn!("Checkout requested but payments are not configured");
                return Err(ApiError::NotConfigured(MSG_NOT_CONFIGURED.to_string()));
            }
        };

        let booking = validate_booking(request)?;

        let mut charged = booking.total;
        if let Some(code) = non_blank(request.discount_code.as_deref()) {
            match self.discounts.evaluate(code, booking.total) {
                DiscountOutcome::Valid { discounted_total, .. } => charged = discounted_total,
                DiscountOutcome::Invalid => {
                    return Err(ApiError::Validation(MSG_DISCOUNT_INVALID.to_string()))
                }
            }
        }

        let availability = self
            .blocked
            .check_availability(booking.room, booking.check_in, booking.check_out)
            .await;
        match availability {
            Availability::Blocked => {
                tracing::info!(
                    "Rejected checkout for {} {} -> {}: dates already blocked",
                    booking.room,
                    booking.check_in,
                    booking.check_out
                );
                return Err(ApiError::Conflict(MSG_DATES_TAKEN.to_string()));
            }
            Availability::Unknown => {
                tracing::warn!("Availability unknown at checkout, proceeding with payment");
            }
            Availability::Available => {}
        }

        let amount_cents = amount_in_cents(charged)
            .ok_or_else(|| ApiError::Validation(MSG_AMOUNT_INVALID.to_string()))?;
        let session = build_session_request(&booking, amount_cents, base_url);

        gateway
            .create_checkout_session(&session)
            .await
            .map_err(|e| ApiError::Upstream {
                message: MSG_PROVIDER_FAILED.to_string(),
                detail: e.to_string(),
            })
    }

    /// Preview a discount code against a total
    ///
    /// Anything unparseable is simply not a valid discount.
    pub fn preview_discount(&self, code: Option<&str>, total: Option<&str>) -> DiscountPreviewResponse {
        let total = total
            .and_then(|t| t.trim().parse::<f64>().ok())
            .and_then(Decimal::from_f64);
        match (non_blank(code), total) {
            (Some(code), Some(total)) => self.discounts.evaluate(code, total).into(),
            _ => DiscountOutcome::Invalid.into(),
        }
    }
}

fn validate_booking(request: &CheckoutRequest) -> Result<ValidatedBooking, ApiError> {
    let invalid = || ApiError::Validation(MSG_BOOKING_INVALID.to_string());

    let room = non_blank(request.room_id.as_deref());
    let check_in = non_blank(request.check_in.as_deref());
    let check_out = non_blank(request.check_out.as_deref());
    let name = non_blank(request.name.as_deref());
    let email = non_blank(request.email.as_deref());
    let (Some(room), Some(check_in), Some(check_out), Some(name), Some(email), Some(nights)) =
        (room, check_in, check_out, name, email, request.nights)
    else {
        return Err(invalid());
    };

    let room: RoomId = room.parse().map_err(|_| invalid())?;
    let (check_in, check_out) = parse_stay(check_in, check_out).ok_or_else(invalid)?;

    let total = request
        .total
        .filter(|t| t.is_finite() && *t >= 0.0)
        .and_then(Decimal::from_f64);
    let (Some(total), true) = (total, nights.is_finite() && nights >= 1.0) else {
        return Err(ApiError::Validation(MSG_AMOUNT_INVALID.to_string()));
    };

    Ok(ValidatedBooking {
        room,
        check_in,
        check_out,
        name: name.to_string(),
        email: email.to_string(),
        phone: request.phone.as_deref().map(str::trim).unwrap_or_default().to_string(),
        guests: request.guests.unwrap_or(1),
        nights,
        total,
    })
}

/// Amount charged in cents: rounded, never below one cent
pub fn amount_in_cents(total: Decimal) -> Option<i64> {
    let cents = total
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()?;
    Some(cents.max(1))
}

fn build_session_request(
    booking: &ValidatedBooking,
    amount_cents: i64,
    base_url: &str,
) -> CheckoutSessionRequest {
    let room = booking.room.as_str();
    CheckoutSessionRequest {
        amount_cents,
        currency: CURRENCY.to_string(),
        customer_email: booking.email.clone(),
        product_name: format!("Soggiorno Ohana B&B – camera {}", room.to_uppercase()),
        product_description: format!(
            "{} notte/i, {} ospite/i ({} → {})",
            booking.nights, booking.guests, booking.check_in, booking.check_out
        ),
        metadata: BookingMetadata {
            room_id: room.to_string(),
            check_in: booking.check_in.to_string(),
            check_out: booking.check_out.to_string(),
            guests: booking.guests.to_string(),
            name: booking.name.clone(),
            phone: booking.phone.clone(),
            nights: booking.nights.to_string(),
        },
        success_url: format!(
            "{}/prenotazione-completata?session_id={{CHECKOUT_SESSION_ID}}",
            base_url
        ),
        cancel_url: format!("{}/prenota/{}", base_url, room),
    }
}
