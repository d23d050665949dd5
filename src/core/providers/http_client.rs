use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
const USER_AGENT: &str = concat!("briefloop/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the LLM endpoint and the token endpoint.
pub fn build_http_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "HTTP client builder failed; using defaults");
            Client::new()
        })
}
