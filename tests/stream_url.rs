//! Property tests for the streaming URL encoder: every parameter must
//! survive percent-encoding and decode back to its original value.

use std::collections::HashMap;

use proptest::prelude::*;

use cardbank_async::stream::stream_url;
use cardbank_async::types::GenerateRequest;
use cardbank_async::{CardBankError, Config};

#[derive(Clone)]
struct FixtureConfig {
    token: Option<String>,
}

impl Config for FixtureConfig {
    fn headers(&self) -> Result<reqwest::header::HeaderMap, CardBankError> {
        Ok(reqwest::header::HeaderMap::new())
    }

    fn url(&self, path: &str) -> String {
        format!("https://cards.example.com{path}")
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim)
    }
}

fn decoded_query(url: &reqwest::Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

proptest! {
    #[test]
    fn query_parameters_round_trip(
        topic in "[^\\s]\\PC{0,40}",
        scenario in proptest::option::of("\\PC{0,40}"),
        card_count in 1u32..=200,
        difficulty in "[a-z]{1,12}",
        language in "[a-z]{2}(-[A-Z]{2})?",
        with_images in any::<bool>(),
        token in proptest::option::of("[A-Za-z0-9._-]{1,48}"),
    ) {
        prop_assume!(!topic.trim().is_empty());

        let request = GenerateRequest {
            topic: topic.clone(),
            scenario: scenario.clone(),
            card_count,
            difficulty: difficulty.clone(),
            language: language.clone(),
            with_images,
        };
        let config = FixtureConfig { token: token.clone() };

        let url = stream_url(&config, &request).unwrap();
        let q = decoded_query(&url);

        prop_assert_eq!(&q["topic"], &topic);
        prop_assert_eq!(&q["scenario"], &scenario.unwrap_or_default());
        prop_assert_eq!(&q["cardCount"], &card_count.to_string());
        prop_assert_eq!(&q["difficulty"], &difficulty);
        prop_assert_eq!(&q["language"], &language);
        prop_assert_eq!(&q["withImages"], if with_images { "true" } else { "false" });
        prop_assert_eq!(&q["token"], &token.unwrap_or_default());
        prop_assert_eq!(q.len(), 7);
    }
}

#[test]
fn base_url_and_path_are_preserved() {
    let request = GenerateRequest {
        topic: "graph theory".into(),
        scenario: None,
        card_count: 1,
        difficulty: "hard".into(),
        language: "en".into(),
        with_images: true,
    };
    let url = stream_url(&FixtureConfig { token: None }, &request).unwrap();
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.host_str(), Some("cards.example.com"));
    assert_eq!(url.path(), "/api/question-bank/generate-stream");
}
