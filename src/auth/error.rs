// Admin authentication error types

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Reasons an admin request is refused
///
/// All variants produce the same 401 response; the distinction only shows
/// in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("bearer token does not match")]
    InvalidToken,

    #[error("admin secret is not configured")]
    SecretNotConfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
