// Error handling module for the booking API
// Provides centralized error types and HTTP response conversion

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::AuthError;

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code. Messages carried by the
/// client-facing variants are short sentences in the site's language; upstream
/// and internal details are logged and never returned.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input detected by hand-written checks
    /// Maps to HTTP 400 Bad Request
    #[error("{0}")]
    Validation(String),

    /// Field-level validation errors from the validator crate
    /// Maps to HTTP 400 Bad Request
    #[error("Request validation failed")]
    InvalidInput(validator::ValidationErrors),

    /// The request is well formed but conflicts with current state
    /// Maps to HTTP 409 Conflict
    #[error("{0}")]
    Conflict(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    #[error("{0}")]
    NotFound(String),

    /// Bad or missing admin credentials
    /// Maps to HTTP 401 Unauthorized
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// An external collaborator (payment, email) is not configured
    /// Maps to HTTP 500 Internal Server Error
    #[error("{0}")]
    NotConfigured(String),

    /// An external provider rejected or failed the call
    /// Maps to HTTP 502 Bad Gateway
    #[error("{message}: {detail}")]
    Upstream { message: String, detail: String },
}

/// Consistent error response structure
///
/// Provides both machine-readable (error_code) and human-readable (message)
/// information for every failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// A request body that could not be read as the expected JSON
    pub fn unreadable_body(rejection: JsonRejection, message: &str) -> Self {
        debug!("Rejected request body: {}", rejection);
        ApiError::Validation(message.to_string())
    }

    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logs at a level matching the severity: debug for expected client
    /// errors, warn for security-relevant ones, error for 5xx.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(message) => {
                debug!("Validation error: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("VALIDATION_ERROR", message.clone()),
                )
            }
            ApiError::InvalidInput(errors) => {
                debug!("Validation error: {:?}", errors);
                let mut response = ErrorResponse::new("VALIDATION_ERROR", "Dati non validi.");
                response.details =
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, response)
            }
            ApiError::Conflict(message) => {
                warn!("Conflict error: {}", message);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("CONFLICT", message.clone()),
                )
            }
            ApiError::NotFound(message) => {
                debug!("Resource not found: {}", message);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", message.clone()),
                )
            }
            ApiError::Unauthorized(reason) => {
                warn!("Unauthorized access attempt: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("UNAUTHORIZED", "Non autorizzato."),
                )
            }
            ApiError::NotConfigured(message) => {
                error!("Missing configuration: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("NOT_CONFIGURED", message.clone()),
                )
            }
            ApiError::Upstream { message, detail } => {
                error!("Upstream error: {} ({})", message, detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("UPSTREAM_ERROR", message.clone()),
                )
            }
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::InvalidInput(errors)
    }
}
