//! # streamprobe - Streaming agent engine probe
//!
//! A small library and terminal front-end for manually exercising a remote
//! agent engine: create a session, send a chat message, and watch the streamed
//! response render as formatted JSON.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental decoder for SSE (`data: ...`) and JSON-Lines bodies
//! - Chunk-boundary independent: UTF-8 and lines are reassembled across chunks
//! - Session creation and streamed queries over a bearer-authenticated HTTP API
//! - Pluggable output sinks
//!
//! ## Architecture
//!
//! - **`StreamDecoder`**: pure transformation from byte chunks to `RenderEvent`s
//! - **`decode_stream`**: drives a decoder from any chunked byte stream
//! - **`Client` / `StreamingClient`**: transport traits, implemented by `AgentEngineClient`
//! - **`Probe`**: owns the configuration and current session, reports to a `RenderSink`
//!
//! ## Example
//! ```no_run
//! use streamprobe::decoder::FramingMode;
//! use streamprobe::options::ProbeOptions;
//! use streamprobe::probe::Probe;
//! use streamprobe::providers::AgentEngineClient;
//! use streamprobe::render::ConsoleSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ProbeOptions::new("https://example.com/v1/reasoningEngines/42")
//!         .with_framing(FramingMode::Sse)
//!         .with_require_session(true);
//!
//!     let client = AgentEngineClient::new(options.transport("your-access-token"));
//!     let mut probe = Probe::new(client, options);
//!     let mut sink = ConsoleSink::stdio();
//!
//!     probe.create_session("user-1", &mut sink).await?;
//!     probe.send_message("Hello!", &mut sink).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod credentials;
pub mod decoder;
pub mod http;
pub mod model;
pub mod options;
pub mod probe;
pub mod providers;
pub mod render;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{Client, ClientError, StreamingClient};
pub use decoder::{FramingMode, StreamDecoder};
pub use model::{RenderEvent, Session, StreamQuery};
pub use probe::Probe;
