//! Type definitions for CardBank API requests and responses

/// Question-card and image records carried by stream events and responses
pub mod cards;
/// Response envelope shared by the request/response endpoints
pub mod common;
/// Generation request parameters
pub mod generate;

pub use cards::{CardImage, QuestionCard};
pub use common::ApiResult;
pub use generate::{GenerateRequest, GenerateRequestBuilder};
