//! Server-sent event decoding and classification.
//!
//! Two layers: [`SseDecoder`] turns raw body bytes into [`SseFrame`]s across
//! arbitrary chunk boundaries, and [`StreamEvent::from_frame`] maps each
//! frame onto the generation stream's event vocabulary. Frames that carry a
//! structured payload which fails to decode are dropped rather than
//! escalated: one malformed chunk must not abort an otherwise-successful
//! long-running generation.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::cards::{CardImage, QuestionCard};

/// Legacy completion sentinel sent on the default message channel; never
/// forwarded to callers.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Fallback text for `error` events that arrive with an empty payload.
pub const STREAM_ERROR_FALLBACK: &str = "stream generation failed";

/// Raw SSE frame with optional event name and data payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name (from the `event:` line); `None` for unnamed frames
    pub event: Option<String>,
    /// Data payload (from `data:` lines, joined with newlines when multiline)
    pub data: String,
}

impl SseFrame {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty()
    }
}

/// Incremental SSE decoder.
///
/// Feed it body chunks as they arrive; it buffers partial lines, joins
/// multi-line `data:` fields, and emits a frame at each blank-line
/// terminator. `id:`, `retry:` and comment lines are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    frame: SseFrame,
}

impl SseDecoder {
    /// Creates a new decoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes, returning every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if !self.frame.is_empty() {
                    frames.push(std::mem::take(&mut self.frame));
                }
            } else {
                self.feed_line(line);
            }
        }
        frames
    }

    /// Flushes the trailing frame when the stream ends without a blank-line
    /// terminator.
    pub fn flush(&mut self) -> Option<SseFrame> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.feed_line(rest.trim_end_matches('\r'));
        }
        if self.frame.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.frame))
        }
    }

    fn feed_line(&mut self, line: &str) {
        if let Some(value) = line.strip_prefix("event:") {
            self.frame.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            if !self.frame.data.is_empty() {
                self.frame.data.push('\n');
            }
            self.frame.data.push_str(value);
        }
    }
}

/// One decoded event from a generation stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Generated content chunk
    Message(String),
    /// Reasoning-trace chunk
    Thinking(String),
    /// Image data for a single card
    ImageSingle(CardImage),
    /// Batched image metadata for several cards
    Images(Vec<CardImage>),
    /// Cards persisted server-side, with their database identifiers
    Saved(Vec<QuestionCard>),
    /// Generation finished; terminal
    Done,
    /// Generation failed; terminal
    Error(String),
}

impl StreamEvent {
    /// Classifies and decodes one frame.
    ///
    /// Returns `None` when the frame carries nothing for the caller: empty
    /// text, the `[DONE]` sentinel, an unknown event name, or a structured
    /// payload that fails to decode.
    #[must_use]
    pub fn from_frame(frame: SseFrame) -> Option<Self> {
        match frame.event.as_deref().unwrap_or("message") {
            "message" => {
                if frame.data.is_empty() || frame.data == DONE_SENTINEL {
                    None
                } else {
                    Some(Self::Message(frame.data))
                }
            }
            "thinking" => {
                if frame.data.is_empty() {
                    None
                } else {
                    Some(Self::Thinking(frame.data))
                }
            }
            "image_single" => decode("image_single", &frame.data).map(Self::ImageSingle),
            "images" => decode("images", &frame.data).map(Self::Images),
            "saved" => decode("saved", &frame.data).map(Self::Saved),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error(if frame.data.is_empty() {
                STREAM_ERROR_FALLBACK.to_string()
            } else {
                frame.data
            })),
            other => {
                debug!(event = other, "ignoring unknown stream event");
                None
            }
        }
    }
}

fn decode<T: DeserializeOwned>(kind: &str, data: &str) -> Option<T> {
    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%error, kind, "dropping undecodable stream event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: event.map(str::to_string),
            data: data.to_string(),
        }
    }

    #[test]
    fn decoder_single_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"event: thinking\ndata: step one\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("thinking"));
        assert_eq!(frames[0].data, "step one");
    }

    #[test]
    fn decoder_unnamed_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: hello\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "hello");
    }

    #[test]
    fn decoder_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: line1\ndata: line2\ndata: line3\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "line1\nline2\nline3");
    }

    #[test]
    fn decoder_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: saved\nda").is_empty());
        let frames = decoder.push(b"ta: [1,2]\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("saved"));
        assert_eq!(frames[0].data, "[1,2]");
    }

    #[test]
    fn decoder_multiple_frames_per_chunk() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: one\n\nevent: done\ndata: [DONE]\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "one");
        assert_eq!(frames[1].event.as_deref(), Some("done"));
    }

    #[test]
    fn decoder_crlf_lines() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"event: message\r\ndata: hi\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "hi");
    }

    #[test]
    fn decoder_ignores_comments_and_ids() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": keep-alive\nid: 7\nretry: 100\ndata: payload\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].data, "payload");
    }

    #[test]
    fn decoder_empty_data_line() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"event: error\ndata: \n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "");
    }

    #[test]
    fn decoder_flush_unterminated_frame() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: done\ndata: [DONE]").is_empty());
        let f = decoder.flush().unwrap();
        assert_eq!(f.event.as_deref(), Some("done"));
        assert_eq!(f.data, "[DONE]");
        assert!(decoder.flush().is_none());
    }

    #[test]
    fn classify_message_passthrough() {
        let event = StreamEvent::from_frame(frame(None, "hello")).unwrap();
        assert_eq!(event, StreamEvent::Message("hello".into()));
        let event = StreamEvent::from_frame(frame(Some("message"), "hello")).unwrap();
        assert_eq!(event, StreamEvent::Message("hello".into()));
    }

    #[test]
    fn classify_drops_done_sentinel() {
        assert_eq!(StreamEvent::from_frame(frame(None, "[DONE]")), None);
        assert_eq!(StreamEvent::from_frame(frame(Some("message"), "[DONE]")), None);
    }

    #[test]
    fn classify_drops_empty_text() {
        assert_eq!(StreamEvent::from_frame(frame(None, "")), None);
        assert_eq!(StreamEvent::from_frame(frame(Some("thinking"), "")), None);
    }

    #[test]
    fn classify_thinking() {
        let event = StreamEvent::from_frame(frame(Some("thinking"), "step")).unwrap();
        assert_eq!(event, StreamEvent::Thinking("step".into()));
    }

    #[test]
    fn classify_image_single() {
        let data = r#"{"question":"Q","answer":"A","questionImage":"u","index":0}"#;
        match StreamEvent::from_frame(frame(Some("image_single"), data)) {
            Some(StreamEvent::ImageSingle(card)) => {
                assert_eq!(card.question, "Q");
                assert_eq!(card.question_image.as_deref(), Some("u"));
            }
            other => panic!("Expected ImageSingle, got {other:?}"),
        }
    }

    #[test]
    fn classify_drops_malformed_structured_payload() {
        assert_eq!(
            StreamEvent::from_frame(frame(Some("image_single"), "{not json")),
            None
        );
        assert_eq!(StreamEvent::from_frame(frame(Some("images"), "42")), None);
        assert_eq!(StreamEvent::from_frame(frame(Some("saved"), "")), None);
    }

    #[test]
    fn classify_saved_cards() {
        let data = r#"[{"id":1,"bankId":2,"question":"Q","answer":"A"}]"#;
        match StreamEvent::from_frame(frame(Some("saved"), data)) {
            Some(StreamEvent::Saved(cards)) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].id, 1);
            }
            other => panic!("Expected Saved, got {other:?}"),
        }
    }

    #[test]
    fn classify_done_ignores_payload() {
        assert_eq!(
            StreamEvent::from_frame(frame(Some("done"), "[DONE]")),
            Some(StreamEvent::Done)
        );
        assert_eq!(
            StreamEvent::from_frame(frame(Some("done"), "")),
            Some(StreamEvent::Done)
        );
    }

    #[test]
    fn classify_error_with_fallback() {
        assert_eq!(
            StreamEvent::from_frame(frame(Some("error"), "quota exceeded")),
            Some(StreamEvent::Error("quota exceeded".into()))
        );
        assert_eq!(
            StreamEvent::from_frame(frame(Some("error"), "")),
            Some(StreamEvent::Error(STREAM_ERROR_FALLBACK.into()))
        );
    }

    #[test]
    fn classify_drops_unknown_event() {
        assert_eq!(StreamEvent::from_frame(frame(Some("ping"), "{}")), None);
    }
}
