// HTTP handlers for availability and blocked-period endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::blocked::{
    AvailabilityQuery, AvailabilityResponse, BlockedPeriod, CreateBlockedPeriodRequest,
    DeleteByIdRequest, NewBlockedPeriod, ID_REQUIRED,
};
use crate::error::ApiError;
use crate::rooms::RoomId;
use crate::validation::{non_blank, parse_stay};
use crate::AppState;

/// Check whether a room is free for a stay
/// GET /api/availability/check
#[utoipa::path(
    get,
    path = "/api/availability/check",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability of the room", body = AvailabilityResponse),
        (status = 400, description = "Missing or invalid parameters")
    ),
    tag = "availability"
)]
pub async fn check_availability_handler(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let invalid = || {
        ApiError::Validation(
            "Parametri roomId, checkIn, checkOut richiesti (roomId: sun|moon|earth).".to_string(),
        )
    };

    let room: RoomId = non_blank(query.room_id.as_deref())
        .and_then(|r| r.parse().ok())
        .ok_or_else(invalid)?;
    let (check_in, check_out) = match (
        non_blank(query.check_in.as_deref()),
        non_blank(query.check_out.as_deref()),
    ) {
        (Some(check_in), Some(check_out)) => parse_stay(check_in, check_out).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    tracing::debug!("Checking availability of {} from {} to {}", room, check_in, check_out);
    let status = state.blocked.check_availability(room, check_in, check_out).await;
    Ok(Json(status.into()))
}

/// List all blocked periods (used by the booking calendar)
/// GET /api/availability/blocked
#[utoipa::path(
    get,
    path = "/api/availability/blocked",
    responses(
        (status = 200, description = "All blocked periods; empty when storage is unavailable", body = Vec<BlockedPeriod>)
    ),
    tag = "availability"
)]
pub async fn list_blocked_public_handler(State(state): State<AppState>) -> Json<Vec<BlockedPeriod>> {
    Json(state.blocked.list().await)
}

/// List all blocked periods
/// GET /api/admin/blocked
#[utoipa::path(
    get,
    path = "/api/admin/blocked",
    responses(
        (status = 200, description = "All blocked periods", body = Vec<BlockedPeriod>),
        (status = 401, description = "Missing or wrong admin secret")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn list_blocked_handler(State(state): State<AppState>) -> Json<Vec<BlockedPeriod>> {
    Json(state.blocked.list().await)
}

/// Block a room for a date range
/// POST /api/admin/blocked
#[utoipa::path(
    post,
    path = "/api/admin/blocked",
    request_body = CreateBlockedPeriodRequest,
    responses(
        (status = 200, description = "The created block", body = BlockedPeriod),
        (status = 400, description = "Invalid room or dates"),
        (status = 401, description = "Missing or wrong admin secret")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn create_blocked_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateBlockedPeriodRequest>, JsonRejection>,
) -> Result<Json<BlockedPeriod>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::unreadable_body(
            rejection,
            "Dati non validi: roomId (sun|moon|earth), checkIn e checkOut (YYYY-MM-DD) richiesti.",
        )
    })?;
    request.validate()?;

    let period = state
        .blocked
        .add(NewBlockedPeriod {
            room_id: request.room_id,
            check_in: request.check_in,
            check_out: request.check_out,
            note: non_blank(request.note.as_deref()).map(str::to_string),
            session_id: None,
        })
        .await;

    Ok(Json(period))
}

/// Remove a blocked period
/// DELETE /api/admin/blocked
#[utoipa::path(
    delete,
    path = "/api/admin/blocked",
    request_body = DeleteByIdRequest,
    responses(
        (status = 200, description = "Block removed"),
        (status = 400, description = "Missing id"),
        (status = 401, description = "Missing or wrong admin secret"),
        (status = 404, description = "No block with that id")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn delete_blocked_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeleteByIdRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::unreadable_body(rejection, ID_REQUIRED))?;
    let id = non_blank(request.id.as_deref())
        .ok_or_else(|| ApiError::Validation(ID_REQUIRED.to_string()))?;

    if !state.blocked.remove(id).await {
        return Err(ApiError::NotFound("Blocco non trovato.".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}
