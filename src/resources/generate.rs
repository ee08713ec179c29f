//! Card generation endpoints.
//!
//! Three entry points share one [`GenerateRequest`] shape: `stream` opens a
//! server-push session and returns immediately, `create` blocks for the
//! whole generation and returns the persisted cards, and `batch` returns the
//! server's raw batch result. Retries apply to the request/response calls
//! only; a stream is never retried.

use crate::client::Client;
use crate::config::Config;
use crate::error::CardBankError;
use crate::stream::{self, StreamCallbacks, StreamHandle};
use crate::types::cards::QuestionCard;
use crate::types::common::ApiResult;
use crate::types::generate::GenerateRequest;

const GENERATE_PATH: &str = "/api/question-bank/generate";
const GENERATE_BATCH_PATH: &str = "/api/question-bank/generate-batch";

/// Card generation resource
pub struct Generate<'c, C: Config> {
    client: &'c Client<C>,
}

impl<C: Config> Client<C> {
    /// Returns the card generation resource
    #[must_use]
    pub const fn generate(&self) -> Generate<'_, C> {
        Generate { client: self }
    }
}

impl<C: Config> Generate<'_, C> {
    /// Opens a streaming generation session.
    ///
    /// Returns as soon as the session task is spawned; connection and event
    /// delivery happen in the background, reported through `callbacks`.
    /// Exactly one terminal callback fires per session: `on_complete` on a
    /// `done` event, or `on_error` on a stream error or transport failure.
    /// Neither fires when the caller closes the handle first.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CardBankError::Validation`] for a malformed request and
    /// [`CardBankError::Config`] for an unusable base URL. Failures after
    /// this point are reported through `on_error`, not as an `Err`.
    pub fn stream(
        &self,
        request: &GenerateRequest,
        callbacks: StreamCallbacks,
    ) -> Result<StreamHandle, CardBankError> {
        let url = stream::stream_url(self.client.config(), request)?;
        Ok(stream::spawn(self.client.http().clone(), url, callbacks))
    }

    /// Generates cards synchronously and returns the persisted set.
    ///
    /// # Errors
    ///
    /// Returns [`CardBankError::Validation`] for a malformed request,
    /// [`CardBankError::Api`] when the server reports a failure, and
    /// transport or decoding errors otherwise.
    pub async fn create(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<QuestionCard>, CardBankError> {
        request.validate()?;
        let envelope: ApiResult<Vec<QuestionCard>> =
            self.client.post(GENERATE_PATH, request).await?;
        envelope.into_data()
    }

    /// Runs a batch generation and returns the server's raw result text.
    ///
    /// The batch endpoint's payload shape is owned by the server; it is
    /// passed through undecoded.
    ///
    /// # Errors
    ///
    /// Returns [`CardBankError::Validation`] for a malformed request,
    /// [`CardBankError::Api`] when the server reports a failure, and
    /// transport or decoding errors otherwise.
    pub async fn batch(&self, request: &GenerateRequest) -> Result<String, CardBankError> {
        request.validate()?;
        let envelope: ApiResult<String> = self
            .client
            .get_with_query(GENERATE_BATCH_PATH, request)
            .await?;
        envelope.into_data()
    }
}
