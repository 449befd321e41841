// HTTP handlers for review endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::blocked::{DeleteByIdRequest, ID_REQUIRED};
use crate::error::ApiError;
use crate::reviews::{
    NewReview, Review, ReviewListQuery, ReviewStatus, SubmitReviewRequest,
    UpdateReviewStatusRequest,
};
use crate::validation::non_blank;
use crate::AppState;

const NAME_AND_TEXT_REQUIRED: &str = "Nome e messaggio sono obbligatori.";

/// Approved reviews, newest first
/// GET /api/reviews
#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Approved reviews, newest first", body = Vec<Review>)
    ),
    tag = "reviews"
)]
pub async fn list_approved_reviews_handler(State(state): State<AppState>) -> Json<Vec<Review>> {
    Json(state.reviews.list_approved().await)
}

/// Submit a review for moderation
/// POST /api/reviews
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "The stored review, pending moderation", body = Review),
        (status = 400, description = "Name or text missing")
    ),
    tag = "reviews"
)]
pub async fn submit_review_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::unreadable_body(rejection, NAME_AND_TEXT_REQUIRED))?;
    let (Some(name), Some(text)) = (
        non_blank(request.name.as_deref()),
        non_blank(request.text.as_deref()),
    ) else {
        return Err(ApiError::Validation(NAME_AND_TEXT_REQUIRED.to_string()));
    };

    let review = state
        .reviews
        .submit(NewReview {
            name: name.to_string(),
            text: text.to_string(),
            rating: request.numeric_rating(),
        })
        .await;

    Ok(Json(review))
}

/// All reviews, optionally filtered by status
/// GET /api/admin/reviews
#[utoipa::path(
    get,
    path = "/api/admin/reviews",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews in storage order", body = Vec<Review>),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Missing or wrong admin secret")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn list_all_reviews_handler(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = match non_blank(query.status.as_deref()) {
        None => state.reviews.list_all().await,
        Some(status) => {
            let status: ReviewStatus = status
                .parse()
                .map_err(|_| ApiError::Validation(status_required_message()))?;
            state.reviews.list_by_status(status).await
        }
    };
    Ok(Json(reviews))
}

/// Change the moderation status of a review
/// PATCH /api/admin/reviews
#[utoipa::path(
    patch,
    path = "/api/admin/reviews",
    request_body = UpdateReviewStatusRequest,
    responses(
        (status = 200, description = "The updated review", body = Review),
        (status = 400, description = "Missing id or invalid status"),
        (status = 401, description = "Missing or wrong admin secret"),
        (status = 404, description = "No review with that id")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn update_review_status_handler(
    State(state): State<AppState>,
    payload: Result<Json<UpdateReviewStatusRequest>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| ApiError::unreadable_body(rejection, &status_required_message()))?;
    let id = non_blank(request.id.as_deref());
    let status = non_blank(request.status.as_deref()).and_then(|s| s.parse::<ReviewStatus>().ok());
    let (Some(id), Some(status)) = (id, status) else {
        return Err(ApiError::Validation(status_required_message()));
    };

    state
        .reviews
        .set_status(id, status)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Recensione non trovata.".to_string()))
}

/// Delete a review
/// DELETE /api/admin/reviews
#[utoipa::path(
    delete,
    path = "/api/admin/reviews",
    request_body = DeleteByIdRequest,
    responses(
        (status = 200, description = "Review deleted"),
        (status = 400, description = "Missing id"),
        (status = 401, description = "Missing or wrong admin secret"),
        (status = 404, description = "No review with that id")
    ),
    security(("admin_secret" = [])),
    tag = "admin"
)]
pub async fn delete_review_handler(
    State(state): State<AppState>,
    payload: Result<Json<DeleteByIdRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::unreadable_body(rejection, ID_REQUIRED))?;
    let id = non_blank(request.id.as_deref())
        .ok_or_else(|| ApiError::Validation(ID_REQUIRED.to_string()))?;

    if !state.reviews.delete(id).await {
        return Err(ApiError::NotFound("Recensione non trovata.".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

fn status_required_message() -> String {
    "Parametri id e status (approved/rejected/pending) richiesti.".to_string()
}
