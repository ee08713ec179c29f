use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{config::Config, error::CardBankError, retry};

/// Per-request timeout for the request/response generation endpoints.
/// Generation is slow; this mirrors the 120s budget the web client allows.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// CardBank API client
///
/// The client is generic over a [`Config`] implementation that provides
/// authentication and API configuration. It serves the request/response
/// endpoints directly and hands its connection pool to streaming sessions.
#[derive(Debug, Clone)]
pub struct Client<C: Config> {
    http: reqwest::Client,
    config: C,
    backoff: backoff::ExponentialBackoff,
}

impl Client<crate::config::CardBankConfig> {
    /// Creates a new client with default configuration
    ///
    /// Uses environment variables for configuration:
    /// - `CARDBANK_BASE_URL` for the API base URL
    /// - `CARDBANK_TOKEN` for the bearer credential
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(crate::config::CardBankConfig::new())
    }
}

impl<C: Config + Default> Default for Client<C> {
    fn default() -> Self {
        Self::with_config(C::default())
    }
}

impl<C: Config> Client<C> {
    /// Creates a new client with the given configuration.
    ///
    /// No overall timeout is set on the underlying HTTP client: a streaming
    /// session may stay open for the whole generation run. Request/response
    /// calls apply their own per-request timeout instead.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest client cannot be built.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest client"),
            config,
            backoff: retry::default_backoff(),
        }
    }

    /// Replaces the HTTP client with a custom one
    ///
    /// Useful for setting custom proxies or TLS configuration. Avoid setting
    /// an overall timeout here; it would also cap streaming sessions.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the backoff configuration for retry logic
    ///
    /// By default, the client uses exponential backoff with jitter. Retries
    /// apply to the request/response endpoints only, never to streams.
    #[must_use]
    pub fn with_backoff(mut self, backoff: backoff::ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a reference to the client's configuration
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn get_with_query<Q, O>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<O, CardBankError>
    where
        Q: Serialize + Sync + ?Sized,
        O: DeserializeOwned,
    {
        let mk = || async {
            Ok(self
                .http
                .get(self.config.url(path))
                .headers(self.config.headers()?)
                .query(query)
                .timeout(REQUEST_TIMEOUT)
                .build()?)
        };
        self.execute(mk).await
    }

    pub(crate) async fn post<I, O>(&self, path: &str, body: &I) -> Result<O, CardBankError>
    where
        I: Serialize + Send + Sync,
        O: DeserializeOwned,
    {
        let mk = || async {
            Ok(self
                .http
                .post(self.config.url(path))
                .headers(self.config.headers()?)
                .json(body)
                .timeout(REQUEST_TIMEOUT)
                .build()?)
        };
        self.execute(mk).await
    }

    async fn execute<O, M, Fut>(&self, mk: M) -> Result<O, CardBankError>
    where
        O: DeserializeOwned,
        M: Fn() -> Fut + Send + Sync,
        Fut: core::future::Future<Output = Result<reqwest::Request, CardBankError>> + Send,
    {
        let bytes = self.execute_raw(mk).await?;
        let resp: O =
            serde_json::from_slice(&bytes).map_err(|e| crate::error::map_deser(&e, &bytes))?;
        Ok(resp)
    }

    async fn execute_raw<M, Fut>(&self, mk: M) -> Result<bytes::Bytes, CardBankError>
    where
        M: Fn() -> Fut + Send + Sync,
        Fut: core::future::Future<Output = Result<reqwest::Request, CardBankError>> + Send,
    {
        let http_client = self.http.clone();

        backoff::future::retry(self.backoff.clone(), || async {
            let request = mk().await.map_err(backoff::Error::Permanent)?;
            let response = http_client
                .execute(request)
                .await
                .map_err(CardBankError::Reqwest)
                .map_err(backoff::Error::Permanent)?;

            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response
                .bytes()
                .await
                .map_err(CardBankError::Reqwest)
                .map_err(backoff::Error::Permanent)?;

            if status.is_success() {
                return Ok(bytes);
            }

            if crate::retry::is_retryable_status(status.as_u16()) {
                let err = crate::error::deserialize_api_error(status, &bytes);
                if let Some(retry_after) = crate::retry::parse_retry_after(&headers) {
                    return Err(backoff::Error::retry_after(err, retry_after));
                }
                return Err(backoff::Error::transient(err));
            }

            Err(backoff::Error::Permanent(
                crate::error::deserialize_api_error(status, &bytes),
            ))
        })
        .await
    }
}
