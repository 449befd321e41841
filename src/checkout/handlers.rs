// HTTP handlers for checkout endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use crate::checkout::{CheckoutRequest, CheckoutResponse, DiscountPreviewQuery, DiscountPreviewResponse};
use crate::error::ApiError;
use crate::AppState;

/// Preview a discount code
/// GET /api/checkout/validate
#[utoipa::path(
    get,
    path = "/api/checkout/validate",
    params(DiscountPreviewQuery),
    responses(
        (status = 200, description = "Whether the code applies, and the resulting total", body = DiscountPreviewResponse)
    ),
    tag = "checkout"
)]
pub async fn validate_discount_handler(
    State(state): State<AppState>,
    Query(query): Query<DiscountPreviewQuery>,
) -> Json<DiscountPreviewResponse> {
    Json(
        state
            .checkout
            .preview_discount(query.code.as_deref(), query.total.as_deref()),
    )
}

/// Start a payment for a booking
/// POST /api/checkout
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted payment page", body = CheckoutResponse),
        (status = 400, description = "Invalid booking, amount or discount code"),
        (status = 409, description = "Dates no longer available"),
        (status = 500, description = "Payments not configured"),
        (status = 502, description = "Payment provider error")
    ),
    tag = "checkout"
)]
pub async fn create_checkout_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::unreadable_body(rejection, "Richiesta non valida (body JSON mancante o errato).")
    })?;

    let session = state.checkout.create_checkout(&request).await?;
    Ok(Json(CheckoutResponse { url: session.url }))
}
