use std::time::Duration;

/// Timeout applied to every outbound provider call
pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the `reqwest::Client` shared by the payment and email providers
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .user_agent(concat!("bnb-booking-api/", env!("CARGO_PKG_VERSION")))
        .build()
}
