use serde::Deserialize;

use crate::error::{ApiErrorObject, CardBankError};

/// Business code the server uses for successful responses.
const CODE_SUCCESS: i32 = 200;

/// Response envelope used by every request/response endpoint.
///
/// The server wraps payloads as `{code, message, data}`, with `code` 200 on
/// success and an error description otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult<T> {
    /// Business status code
    pub code: i32,
    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload, present on success
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    /// Unwraps the envelope into its payload.
    ///
    /// # Errors
    ///
    /// Returns [`CardBankError::Api`] when the envelope carries a non-success
    /// code, and [`CardBankError::Serde`] when a success envelope has no
    /// payload.
    pub fn into_data(self) -> Result<T, CardBankError> {
        if self.code == CODE_SUCCESS {
            self.data
                .ok_or_else(|| CardBankError::Serde("response envelope missing data".into()))
        } else {
            Err(CardBankError::Api(ApiErrorObject {
                status: None,
                code: Some(self.code),
                message: self.message.unwrap_or_else(|| "request failed".into()),
            }))
        }
    }
}
