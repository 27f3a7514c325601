//! HTTP plumbing shared by the hosted model clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::ports::AIError;

/// Rate-limit wait assumed when the provider does not say.
pub(crate) const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::InvalidRequest(format!("failed to create HTTP client: {}", e)))
}

/// Maps a transport failure, keeping timeouts distinct from other network errors.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX),
        }
    } else if err.is_connect() {
        AIError::network(format!("connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Passes 2xx responses through and turns anything else into an [`AIError`].
///
/// `retry_after` reads the wait from a 429 body.
pub(crate) async fn ensure_success(
    response: Response,
    retry_after: fn(&str) -> Option<u32>,
) -> Result<Response, AIError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body, retry_after))
}

fn status_error(status: StatusCode, body: String, retry_after: fn(&str) -> Option<u32>) -> AIError {
    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(retry_after(&body).unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        400 | 404 | 422 => AIError::InvalidRequest(body),
        500..=599 => AIError::unavailable(format!("{}: {}", status, body)),
        _ => AIError::network(format!("unexpected status {}: {}", status, body)),
    }
}
