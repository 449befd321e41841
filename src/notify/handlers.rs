// HTTP handler for the admin test email

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

/// Send a booking notification for a sample booking
/// POST /api/admin/test-booking-email
#[utoipa::path(
    post,
    path = "/api/admin/test-booking-email",
    responses(
        (status = 200, description = "Test email accepted by the provider"),
        (status = 401, description = "Missing or wrong admin secret"),
        (status = 500, description = "Email not configured"),
        (status = 502, description = "Email provider rejected the message")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn send_test_email_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let notifier = state
        .notifier
        .as_ref()
        .ok_or_else(|| ApiError::NotConfigured("RESEND_API_KEY non impostata.".to_string()))?;

    let sent = notifier.send_test().await.map_err(|e| ApiError::Upstream {
        message: "Invio email di test non riuscito.".to_string(),
        detail: e.to_string(),
    })?;

    tracing::info!("Test booking email sent to {}", notifier.notify_email());
    Ok(Json(json!({
        "ok": true,
        "message": format!(
            "Email di test inviata a {}. Controlla la casella (e lo spam).",
            notifier.notify_email()
        ),
        "id": sent.id,
    })))
}
