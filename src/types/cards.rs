use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A persisted question card, as returned by the synchronous generation
/// endpoint and carried by the stream's `saved` event.
///
/// Timestamps arrive without a zone offset (server-local wall time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCard {
    /// Database identifier
    pub id: i64,
    /// Identifier of the bank the card was saved into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_id: Option<i64>,
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// URL of the question-side image, when one was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    /// URL of the answer-side image, when one was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_image: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Last-update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Per-card image record carried by the stream's `image_single` event, and
/// batched in the `images` event.
///
/// Image generation is best-effort server-side: either URL may be absent
/// when generation timed out for that side of the card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    /// Card identifier, present only when the card was already persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Question text the image belongs to
    pub question: String,
    /// Answer text the image belongs to
    pub answer: String,
    /// URL of the question-side image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    /// URL of the answer-side image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_image: Option<String>,
    /// Zero-based position of the card within the generated set
    pub index: u32,
}
