use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::discount::DiscountOutcome;

/// Booking form submitted to start a payment
///
/// Every field is optional on the wire so that missing values produce the
/// booking validation message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = "sun")]
    pub room_id: Option<String>,
    #[schema(example = "2025-06-01")]
    pub check_in: Option<String>,
    #[schema(example = "2025-06-05")]
    pub check_out: Option<String>,
    pub guests: Option<u32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nights: Option<f64>,
    /// Pre-discount stay total in euro
    pub total: Option<f64>,
    pub discount_code: Option<String>,
}

/// Hosted payment page to redirect the guest to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscountPreviewQuery {
    /// Discount code as typed by the guest
    pub code: Option<String>,
    /// Pre-discount total in euro
    pub total: Option<String>,
}

/// Discount preview shown on the booking form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPreviewResponse {
    pub valid: bool,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub discounted_total: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub discount_eur: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<DiscountOutcome> for DiscountPreviewResponse {
    fn from(outcome: DiscountOutcome) -> Self {
        match outcome {
            DiscountOutcome::Invalid => Self {
                valid: false,
                discounted_total: None,
                discount_eur: None,
                label: None,
            },
            DiscountOutcome::Valid {
                discounted_total,
                discount_amount,
                label,
            } => Self {
                valid: true,
                discounted_total: Some(discounted_total),
                discount_eur: Some(discount_amount),
                label: Some(label),
            },
        }
    }
}
