//! Shared reqwest client construction.

use reqwest::Client;
use std::time::Duration;
use tally_error::HttpError;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every outbound call.
///
/// # Errors
///
/// Returns error if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .gzip(true)
        .build()
        .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into an [`HttpError`] carrying a body excerpt.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    Err(HttpError::status(status.as_u16(), excerpt))
}
