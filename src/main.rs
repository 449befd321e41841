use bnb_booking_api::{config::AppConfig, create_router, kv, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Ohana B&B API - Starting...");

    let config = AppConfig::from_env();
    tracing::debug!("Loaded configuration: {:?}", config);

    let store = kv::connect(config.redis_url.as_deref())
        .await
        .expect("Failed to connect to the key-value store");

    let state = AppState::from_config(&config, store).expect("Failed to initialize services");
    let app = create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Ohana B&B API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
