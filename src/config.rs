use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// Default CardBank API base URL
pub const CARDBANK_DEFAULT_BASE: &str = "http://localhost:8080";
/// Environment variable for the API base URL
pub const ENV_CARDBANK_BASE_URL: &str = "CARDBANK_BASE_URL";
/// Environment variable for the bearer credential
pub const ENV_CARDBANK_TOKEN: &str = "CARDBANK_TOKEN";

/// Session context for the CardBank API.
///
/// Carries the base URL and the bearer credential explicitly, instead of the
/// web client's habit of reading the token from shared browser storage at
/// call time. This keeps sessions testable and free of ambient state.
#[derive(Debug, Clone)]
pub struct CardBankConfig {
    api_base: String,
    token: Option<String>,
}

impl Default for CardBankConfig {
    fn default() -> Self {
        Self {
            api_base: std::env::var(ENV_CARDBANK_BASE_URL)
                .unwrap_or_else(|_| CARDBANK_DEFAULT_BASE.into()),
            token: std::env::var(ENV_CARDBANK_TOKEN).ok(),
        }
    }
}

impl CardBankConfig {
    /// Creates a new configuration with default settings
    ///
    /// Attempts to read from environment variables:
    /// - `CARDBANK_BASE_URL` for the API base URL (defaults to `http://localhost:8080`)
    /// - `CARDBANK_TOKEN` for the bearer credential
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the bearer credential
    ///
    /// Stored verbatim; surrounding whitespace is trimmed at use, matching
    /// how the web client sanitizes tokens read from storage.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the configured API base URL
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Configuration trait for the CardBank client
///
/// Implement this trait to provide custom authentication and API
/// configuration (e.g. a test double with a canned credential).
pub trait Config: Clone + Send + Sync + 'static {
    /// Returns HTTP headers to include in request/response calls
    ///
    /// # Errors
    ///
    /// Returns an error if header values contain invalid characters.
    fn headers(&self) -> Result<HeaderMap, crate::error::CardBankError>;

    /// Constructs the full URL for an API endpoint
    fn url(&self, path: &str) -> String;

    /// Returns the bearer credential, trimmed, if one is configured
    fn token(&self) -> Option<&str>;
}

impl Config for CardBankConfig {
    fn headers(&self) -> Result<HeaderMap, crate::error::CardBankError> {
        use crate::error::CardBankError;

        let mut h = HeaderMap::new();

        if let Some(token) = self.token() {
            let v = format!("Bearer {token}");
            h.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&v)
                    .map_err(|_| CardBankError::Config("Invalid Authorization header".into()))?,
            );
        }

        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim)
    }
}
