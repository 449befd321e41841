// Booking API for a three-room B&B
//
// Availability calendar, discount codes, guest reviews, hosted card
// checkout with a payment webhook, and a shared-secret admin area.

pub mod auth;
pub mod blocked;
pub mod checkout;
pub mod config;
pub mod discount;
pub mod error;
pub mod http_client;
pub mod ids;
pub mod kv;
pub mod notify;
pub mod payments;
pub mod reviews;
pub mod rooms;
pub mod validation;
pub mod webhook;

#[cfg(test)]
mod test_support;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{require_admin, AdminGuard};
use blocked::BlockedPeriodRepository;
use checkout::CheckoutService;
use config::AppConfig;
use discount::DiscountEvaluator;
use kv::{KvError, KvStore};
use notify::{BookingNotifier, MailError, ResendMailer};
use payments::{PaymentError, PaymentGateway, StripeGateway};
use reviews::ReviewRepository;
use webhook::WebhookService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        blocked::check_availability_handler,
        blocked::list_blocked_public_handler,
        blocked::list_blocked_handler,
        blocked::create_blocked_handler,
        blocked::delete_blocked_handler,
        checkout::handlers::validate_discount_handler,
        checkout::handlers::create_checkout_handler,
        reviews::list_approved_reviews_handler,
        reviews::submit_review_handler,
        reviews::list_all_reviews_handler,
        reviews::update_review_status_handler,
        reviews::delete_review_handler,
        webhook::handlers::stripe_webhook_handler,
        notify::handlers::send_test_email_handler,
        health_handler,
    ),
    components(
        schemas(
            rooms::RoomId,
            blocked::BlockedPeriod,
            blocked::Availability,
            blocked::AvailabilityResponse,
            blocked::CreateBlockedPeriodRequest,
            blocked::DeleteByIdRequest,
            checkout::CheckoutRequest,
            checkout::CheckoutResponse,
            checkout::DiscountPreviewResponse,
            reviews::Review,
            reviews::ReviewStatus,
            reviews::SubmitReviewRequest,
            reviews::UpdateReviewStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "availability", description = "Room availability calendar"),
        (name = "checkout", description = "Discount preview and payment sessions"),
        (name = "reviews", description = "Guest reviews"),
        (name = "webhooks", description = "Payment provider callbacks"),
        (name = "admin", description = "Calendar and review moderation, shared-secret protected"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "Ohana B&B Booking API",
        version = "0.1.0",
        description = "Availability, discounts, reviews and online payments for a three-room B&B"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_secret",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Failure while assembling the application at startup
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("key-value store: {0}")]
    Kv(#[from] KvError),

    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),

    #[error("email client: {0}")]
    Mail(#[from] MailError),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub blocked: BlockedPeriodRepository,
    pub reviews: ReviewRepository,
    pub checkout: CheckoutService,
    pub webhooks: WebhookService,
    pub notifier: Option<BookingNotifier>,
    pub admin: AdminGuard,
}

impl AppState {
    /// Wire the services over already-built collaborators
    pub fn new(
        kv: Arc<dyn KvStore>,
        discounts: DiscountEvaluator,
        gateway: Option<Arc<dyn PaymentGateway>>,
        notifier: Option<BookingNotifier>,
        admin: AdminGuard,
        public_base_url: Option<String>,
    ) -> Self {
        let blocked = BlockedPeriodRepository::new(kv.clone());
        Self {
            reviews: ReviewRepository::new(kv),
            checkout: CheckoutService::new(
                blocked.clone(),
                discounts,
                gateway.clone(),
                public_base_url,
            ),
            webhooks: WebhookService::new(blocked.clone(), gateway, notifier.clone()),
            blocked,
            notifier,
            admin,
        }
    }

    /// Build every collaborator the configuration enables
    pub fn from_config(config: &AppConfig, kv: Arc<dyn KvStore>) -> Result<Self, StartupError> {
        let gateway: Option<Arc<dyn PaymentGateway>> = match &config.stripe {
            Some(stripe) => {
                if stripe.webhook_secret.is_none() {
                    tracing::warn!("STRIPE_WEBHOOK_SECRET not set: payment webhooks will be refused");
                }
                Some(Arc::new(StripeGateway::new(stripe)?))
            }
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set: online payments disabled");
                None
            }
        };

        let notifier = match &config.resend {
            Some(resend) => Some(BookingNotifier::new(
                Arc::new(ResendMailer::new(resend)?),
                resend.from.clone(),
                config.notify_email.clone(),
                config.contact_email.clone(),
                config.contact_phone.clone(),
            )),
            None => {
                tracing::warn!("RESEND_API_KEY not set: booking emails disabled");
                None
            }
        };

        let admin = AdminGuard::new(config.admin_secret.as_deref());
        if !admin.is_enabled() {
            tracing::warn!("ADMIN_SECRET not set: admin endpoints will refuse every request");
        }

        Ok(Self::new(
            kv,
            DiscountEvaluator::new(config.discount_codes.clone()),
            gateway,
            notifier,
            admin,
            config.public_base_url.clone(),
        ))
    }
}

/// Liveness probe
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Admin endpoints, all behind the shared-secret guard
fn admin_routes(guard: AdminGuard) -> Router<AppState> {
    Router::new()
        .route(
            "/blocked",
            get(blocked::list_blocked_handler)
                .post(blocked::create_blocked_handler)
                .delete(blocked::delete_blocked_handler),
        )
        .route(
            "/reviews",
            get(reviews::list_all_reviews_handler)
                .patch(reviews::update_review_status_handler)
                .delete(reviews::delete_review_handler),
        )
        .route(
            "/test-booking-email",
            post(notify::handlers::send_test_email_handler),
        )
        .route_layer(middleware::from_fn_with_state(guard, require_admin))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_handler))
        .route(
            "/api/availability/check",
            get(blocked::check_availability_handler),
        )
        .route(
            "/api/availability/blocked",
            get(blocked::list_blocked_public_handler),
        )
        .route(
            "/api/checkout/validate",
            get(checkout::handlers::validate_discount_handler),
        )
        .route("/api/checkout", post(checkout::handlers::create_checkout_handler))
        .route(
            "/api/reviews",
            get(reviews::list_approved_reviews_handler).post(reviews::submit_review_handler),
        )
        .route(
            "/api/webhooks/stripe",
            post(webhook::handlers::stripe_webhook_handler),
        )
        .nest("/api/admin", admin_routes(state.admin.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
