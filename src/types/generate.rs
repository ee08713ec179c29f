use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::CardBankError;

/// Parameters for one generation request
///
/// Shared by the streaming, synchronous and batch entry points. Immutable
/// once a session starts; the client only reads it to build the outbound
/// request. Field names serialize in the wire's camelCase form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder, Default)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Topic to generate cards about (required, non-empty)
    pub topic: String,
    /// Optional usage scenario refining the topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Number of cards to generate (must be positive)
    pub card_count: u32,
    /// Difficulty label, passed through to the generator
    pub difficulty: String,
    /// Language code for the generated content
    pub language: String,
    /// Whether the server should also generate card images
    pub with_images: bool,
}

impl GenerateRequest {
    /// Validates the request before any connection attempt.
    ///
    /// A malformed request would otherwise open a connection the server
    /// immediately rejects, wasting a connection slot.
    ///
    /// # Errors
    ///
    /// Returns [`CardBankError::Validation`] when `topic` is empty (after
    /// trimming) or `card_count` is zero.
    pub fn validate(&self) -> Result<(), CardBankError> {
        if self.topic.trim().is_empty() {
            return Err(CardBankError::Validation("topic must not be empty".into()));
        }
        if self.card_count == 0 {
            return Err(CardBankError::Validation(
                "cardCount must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> GenerateRequest {
        GenerateRequest {
            topic: "World capitals".into(),
            scenario: Some("pub quiz".into()),
            card_count: 10,
            difficulty: "medium".into(),
            language: "en".into(),
            with_images: true,
        }
    }

    #[test]
    fn request_serializes_camel_case() {
        let s = serde_json::to_string(&valid_request()).unwrap();
        assert!(s.contains(r#""cardCount":10"#));
        assert!(s.contains(r#""withImages":true"#));
        assert!(s.contains(r#""scenario":"pub quiz""#));
    }

    #[test]
    fn scenario_omitted_when_absent() {
        let mut req = valid_request();
        req.scenario = None;
        let s = serde_json::to_string(&req).unwrap();
        assert!(!s.contains("scenario"));
    }

    #[test]
    fn validate_accepts_valid_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_topic() {
        let mut req = valid_request();
        req.topic = "   ".into();
        match req.validate() {
            Err(CardBankError::Validation(msg)) => assert!(msg.contains("topic")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_zero_card_count() {
        let mut req = valid_request();
        req.card_count = 0;
        match req.validate() {
            Err(CardBankError::Validation(msg)) => assert!(msg.contains("cardCount")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn builder_round_trip() {
        let req = GenerateRequestBuilder::default()
            .topic("Rust lifetimes")
            .card_count(5_u32)
            .difficulty("hard")
            .language("en")
            .build()
            .unwrap();
        assert_eq!(req.topic, "Rust lifetimes");
        assert_eq!(req.card_count, 5);
        assert_eq!(req.scenario, None);
        assert!(!req.with_images);
    }
}
