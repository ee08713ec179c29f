//! Streaming session lifecycle and callback dispatch.
//!
//! One session wraps one server-push connection. The caller supplies a
//! [`StreamCallbacks`] set and gets back a [`StreamHandle`] whose only
//! operation is `close`; everything else happens on a background task that
//! owns the connection, decodes frames in arrival order and invokes the
//! callbacks sequentially. Closure is terminal: there is no reconnection,
//! and once the state reaches `Closed` nothing further is dispatched, even
//! for events already decoded and waiting in the current chunk.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures::StreamExt;
use reqwest::Url;
use reqwest::header;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::CardBankError;
use crate::sse::{SseDecoder, StreamEvent};
use crate::types::generate::GenerateRequest;

/// Path of the streaming generation endpoint
const STREAM_PATH: &str = "/api/question-bank/generate-stream";

/// Fallback text surfaced through `on_error` when the transport fails
/// without detail (connection refused, mid-stream disconnect, non-2xx).
pub const TRANSPORT_ERROR_FALLBACK: &str = "stream connection failed";

/// Lifecycle state of one streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Connection attempt in flight
    Connecting = 0,
    /// Transport established, events may arrive
    Open = 1,
    /// Terminal; no further dispatch
    Closed = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Caller-supplied reactions for one streaming session.
///
/// `on_message` is mandatory; the rest default to no-ops. Callbacks run
/// sequentially on the session task, in transport arrival order, and may
/// fire in rapid succession; callers serialize their own shared state
/// (append-only accumulation works well).
///
/// Structured events (`image_single`, `images`, `saved`) are re-serialized
/// into a tagged envelope `{"type": ..., "data": ...}` and routed through
/// `on_message`, so consumers inspect a single channel to distinguish text
/// from structured payloads. Downstream code depends on that envelope
/// shape; it is part of the wire contract.
pub struct StreamCallbacks {
    on_message: Box<dyn FnMut(String) + Send>,
    on_thinking: Option<Box<dyn FnMut(String) + Send>>,
    on_error: Option<Box<dyn FnMut(String) + Send>>,
    on_complete: Option<Box<dyn FnOnce() + Send>>,
}

impl StreamCallbacks {
    /// Creates a callback set with the mandatory content reaction
    pub fn new(on_message: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            on_message: Box::new(on_message),
            on_thinking: None,
            on_error: None,
            on_complete: None,
        }
    }

    /// Sets the reaction for reasoning-trace chunks
    #[must_use]
    pub fn with_thinking(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.on_thinking = Some(Box::new(f));
        self
    }

    /// Sets the reaction for stream failure; fires at most once per session
    #[must_use]
    pub fn with_error(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Sets the reaction for normal completion; fires at most once
    #[must_use]
    pub fn with_complete(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn message(&mut self, text: String) {
        (self.on_message)(text);
    }

    fn thinking(&mut self, text: String) {
        if let Some(f) = &mut self.on_thinking {
            f(text);
        }
    }

    fn error(&mut self, message: String) {
        if let Some(f) = &mut self.on_error {
            f(message);
        }
    }

    fn complete(&mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }

    fn envelope<T: Serialize>(&mut self, kind: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(data) => {
                let payload = serde_json::json!({ "type": kind, "data": data });
                (self.on_message)(payload.to_string());
            }
            Err(error) => warn!(%error, kind, "dropping unencodable envelope"),
        }
    }
}

impl std::fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("on_thinking", &self.on_thinking.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Handle to one streaming session.
///
/// The caller never sees the underlying connection; this exposes the
/// lifecycle state and an explicit, idempotent `close`. Dropping the handle
/// does not cancel the session.
#[derive(Debug)]
pub struct StreamHandle {
    state: Arc<AtomicU8>,
    task: tokio::task::JoinHandle<()>,
}

impl StreamHandle {
    /// Returns the current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Returns true once the session has reached its terminal state
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Closes the session and releases the connection.
    ///
    /// Close wins over in-flight data: events received but not yet
    /// dispatched are dropped. Closing an already-closed session is a no-op.
    pub fn close(&self) {
        let prev = self
            .state
            .swap(SessionState::Closed as u8, Ordering::SeqCst);
        if prev != SessionState::Closed as u8 {
            self.task.abort();
            debug!("stream session closed by caller");
        }
    }
}

/// Builds the streaming endpoint URL from the session context and request.
///
/// The bearer credential rides in the `token` query parameter (trimmed,
/// empty when absent; the server is responsible for rejecting it) because
/// the browser transport this server was built for cannot carry headers.
///
/// # Errors
///
/// Returns [`CardBankError::Validation`] for a malformed request, before any
/// connection attempt, and [`CardBankError::Config`] when the configured
/// base URL does not parse.
pub fn stream_url<C: Config>(config: &C, request: &GenerateRequest) -> Result<Url, CardBankError> {
    request.validate()?;

    let card_count = request.card_count.to_string();
    let params = [
        ("topic", request.topic.as_str()),
        ("scenario", request.scenario.as_deref().unwrap_or("")),
        ("cardCount", card_count.as_str()),
        ("difficulty", request.difficulty.as_str()),
        ("language", request.language.as_str()),
        ("withImages", if request.with_images { "true" } else { "false" }),
        ("token", config.token().unwrap_or("")),
    ];

    Url::parse_with_params(&config.url(STREAM_PATH), params)
        .map_err(|e| CardBankError::Config(format!("invalid stream URL: {e}")))
}

/// Spawns the session task. The handle is live immediately; the connection
/// is established on the task so the caller never blocks.
pub(crate) fn spawn(http: reqwest::Client, url: Url, callbacks: StreamCallbacks) -> StreamHandle {
    let state = Arc::new(AtomicU8::new(SessionState::Connecting as u8));
    let task = tokio::spawn(run_session(http, url, callbacks, Arc::clone(&state)));
    StreamHandle { state, task }
}

async fn run_session(
    http: reqwest::Client,
    url: Url,
    mut callbacks: StreamCallbacks,
    state: Arc<AtomicU8>,
) {
    let settled = drive(http, url, &mut callbacks, &state).await;
    if !settled && state.load(Ordering::SeqCst) != SessionState::Closed as u8 {
        callbacks.error(TRANSPORT_ERROR_FALLBACK.to_string());
    }
    state.store(SessionState::Closed as u8, Ordering::SeqCst);
}

/// Runs the connection and dispatch loop.
///
/// Returns true when the session ended deliberately: a terminal event was
/// dispatched, or the caller closed it. A false return means the transport
/// gave out first and the fallback error is still owed.
async fn drive(
    http: reqwest::Client,
    url: Url,
    callbacks: &mut StreamCallbacks,
    state: &AtomicU8,
) -> bool {
    let response = match http
        .get(url)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "stream connection failed");
            return false;
        }
    };

    if !response.status().is_success() {
        warn!(status = %response.status(), "stream rejected by server");
        return false;
    }

    // CONNECTING -> OPEN, unless the caller already closed the session.
    if state
        .compare_exchange(
            SessionState::Connecting as u8,
            SessionState::Open as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_err()
    {
        return true;
    }
    debug!("stream connection established");

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();

    loop {
        let chunk = match body.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(error)) => {
                warn!(%error, "stream transport error");
                return false;
            }
            None => break,
        };
        for frame in decoder.push(&chunk) {
            // Close wins over anything decoded but not yet dispatched.
            if state.load(Ordering::SeqCst) == SessionState::Closed as u8 {
                return true;
            }
            let Some(event) = StreamEvent::from_frame(frame) else {
                continue;
            };
            if dispatch(event, callbacks).is_break() {
                return true;
            }
        }
    }

    // The server ended the body; a final frame may lack its terminator.
    if let Some(frame) = decoder.flush() {
        if state.load(Ordering::SeqCst) == SessionState::Closed as u8 {
            return true;
        }
        if let Some(event) = StreamEvent::from_frame(frame)
            && dispatch(event, callbacks).is_break()
        {
            return true;
        }
    }

    // Body ended without a terminal event: abnormal closure.
    false
}

fn dispatch(event: StreamEvent, callbacks: &mut StreamCallbacks) -> ControlFlow<()> {
    match event {
        StreamEvent::Message(text) => callbacks.message(text),
        StreamEvent::Thinking(text) => callbacks.thinking(text),
        StreamEvent::ImageSingle(card) => callbacks.envelope("image_single", &card),
        StreamEvent::Images(batch) => callbacks.envelope("images", &batch),
        StreamEvent::Saved(cards) => callbacks.envelope("saved", &cards),
        StreamEvent::Done => {
            callbacks.complete();
            return ControlFlow::Break(());
        }
        StreamEvent::Error(message) => {
            callbacks.error(message);
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}
