// Shared-secret guard for admin routes

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::error::AuthError;

/// Checks bearer tokens against the configured admin secret
///
/// With no secret configured every request is refused.
#[derive(Clone)]
pub struct AdminGuard {
    secret_digest: Option<Arc<[u8; 32]>>,
}

impl AdminGuard {
    /// Build a guard; a blank secret counts as unset
    pub fn new(secret: Option<&str>) -> Self {
        let secret_digest = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Arc::new(digest(s)));
        Self { secret_digest }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret_digest.is_some()
    }

    /// Validate the Authorization header of a request
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let expected = self
            .secret_digest
            .as_deref()
            .ok_or(AuthError::SecretNotConfigured)?;

        let auth_header = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        if constant_time_eq(&digest(token), expected) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Middleware function guarding every admin route
///
/// Install with `axum::middleware::from_fn_with_state(guard, require_admin)`.
pub async fn require_admin(
    State(guard): State<AdminGuard>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    if let Err(e) = guard.authorize(request.headers()) {
        warn!("Admin access refused for {}: {}", endpoint, e);
        return Err(e);
    }

    debug!("Admin access granted for {}", endpoint);
    Ok(next.run(request).await)
}

// Hashing first makes the comparison length-independent
fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
