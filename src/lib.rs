#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_docs)]

//! # `cardbank-async`
//!
//! An async Rust client for the CardBank question-card generation API.
//!
//! The centerpiece is the streaming generation client: one server-sent-event
//! connection per generation request, with named events (`message`,
//! `thinking`, `image_single`, `images`, `saved`, `done`, `error`) decoded
//! in arrival order and dispatched to caller-supplied callbacks. Callers
//! never see the transport; they get a [`StreamHandle`] whose only operation
//! is `close`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardbank_async::{Client, StreamCallbacks};
//! use cardbank_async::types::GenerateRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new();
//!
//! let request = GenerateRequest {
//!     topic: "Rust ownership".into(),
//!     scenario: None,
//!     card_count: 5,
//!     difficulty: "medium".into(),
//!     language: "en".into(),
//!     with_images: false,
//! };
//!
//! let callbacks = StreamCallbacks::new(|chunk| print!("{chunk}"))
//!     .with_thinking(|trace| eprintln!("thinking: {trace}"))
//!     .with_error(|msg| eprintln!("failed: {msg}"))
//!     .with_complete(|| println!("done"));
//!
//! let handle = client.generate().stream(&request, callbacks)?;
//! // ... later, to cancel early:
//! handle.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication
//!
//! The bearer credential is carried in the `Authorization` header for the
//! request/response endpoints and in the `token` query parameter for the
//! stream (the server was built for browser `EventSource` clients, which
//! cannot set headers). See [`CardBankConfig`].

/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Error types
pub mod error;
/// API resource implementations
pub mod resources;
/// Retry logic utilities (request/response endpoints only)
pub mod retry;
/// Server-sent event decoding and classification
pub mod sse;
/// Streaming session lifecycle and callback dispatch
pub mod stream;
/// Request and response types
pub mod types;

pub use crate::client::Client;
pub use crate::config::{CardBankConfig, Config};
pub use crate::error::{ApiErrorObject, CardBankError};
pub use crate::stream::{SessionState, StreamCallbacks, StreamHandle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::sse::StreamEvent;
    pub use crate::types::cards::*;
    pub use crate::types::generate::*;
    pub use crate::{CardBankConfig, Client, StreamCallbacks, StreamHandle};
}
