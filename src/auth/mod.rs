// Admin authentication
// A single shared secret, sent as a bearer token, guards the admin routes

pub mod error;
pub mod middleware;

pub use error::AuthError;
pub use middleware::{require_admin, AdminGuard};
