use reqwest::header::HeaderMap;
use std::time::Duration;

/// Creates the default exponential backoff configuration
///
/// Configured with:
/// - Initial interval: 500ms
/// - Max interval: 8s
/// - Max elapsed time: 60s
/// - Randomization factor: 0.25
/// - Multiplier: 2.0
#[must_use]
pub fn default_backoff() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(60)),
        initial_interval: Duration::from_millis(500),
        max_interval: Duration::from_secs(8),
        randomization_factor: 0.25,
        multiplier: 2.0,
        ..Default::default()
    }
}

/// Determines if an HTTP status code should trigger a retry
///
/// Retries on: 408, 429 and 5xx. Applies to the request/response endpoints
/// only; streaming sessions are never retried, closure is terminal.
#[must_use]
pub const fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 429 | 500..=599)
}

/// Parses the `Retry-After` header from the response
///
/// Returns the duration to wait before retrying, capped at 60 seconds.
/// Returns `None` if the header is missing or malformed.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(v) = headers.get("retry-after")
        && let Ok(s) = v.to_str()
        && let Ok(secs) = s.parse::<u64>()
    {
        return Some(Duration::from_secs(secs.min(60)));
    }

    None
}
