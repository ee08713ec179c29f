use thiserror::Error;

/// Errors produced by the CardBank client
#[derive(Debug, Error)]
pub enum CardBankError {
    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Error reported by the CardBank API
    #[error("API error: {0:?}")]
    Api(ApiErrorObject),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Request rejected by client-side validation, before any connection attempt
    #[error("Invalid request: {0}")]
    Validation(String),

    /// (De)serialization error
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Error payload extracted from an API response
#[derive(Debug, Clone)]
pub struct ApiErrorObject {
    /// HTTP status code, when the failure came from a non-2xx response
    pub status: Option<u16>,
    /// Business code from the response envelope, when present
    pub code: Option<i32>,
    /// Human-readable error message
    pub message: String,
}

pub(crate) fn map_deser(e: &serde_json::Error, body: &[u8]) -> CardBankError {
    CardBankError::Serde(format!("{}: {}", e, String::from_utf8_lossy(body)))
}

/// Builds a [`CardBankError::Api`] from a non-2xx response body.
///
/// The server wraps failures in a `{code, message}` envelope; when the body
/// is not that envelope (proxies, HTML error pages) the raw body is used as
/// the message.
pub(crate) fn deserialize_api_error(status: reqwest::StatusCode, body: &[u8]) -> CardBankError {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        code: Option<i32>,
        message: Option<String>,
    }

    let envelope: Option<ErrorEnvelope> = serde_json::from_slice(body).ok();
    let (code, message) = envelope.map_or((None, None), |e| (e.code, e.message));

    CardBankError::Api(ApiErrorObject {
        status: Some(status.as_u16()),
        code,
        message: message.unwrap_or_else(|| {
            let raw = String::from_utf8_lossy(body);
            if raw.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                raw.into_owned()
            }
        }),
    })
}
