use reqwest::blocking::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "mood-app";

/// Blocking client with a hard per-request timeout; nothing in this crate
/// waits on the network without one.
pub fn build_client(timeout_ms: u64, user_agent: &str) -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms.max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|err| format!("failed to build http client: {err}"))
}
