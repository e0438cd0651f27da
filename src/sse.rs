//! Server-Sent Events (SSE) line helpers and the response extension trait.
//!
//! SSE format:
//! ```text
//! data: {"key": "value"}
//!
//! event: message
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```

use futures::Stream;

use crate::client::ClientError;
use crate::decoder::FramingMode;
use crate::model::RenderEvent;
use crate::stream::decode_stream;

/// Literal prefix of an SSE data field.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the end of an SSE stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Extension trait for `reqwest::Response` to decode its body into render events.
///
/// # Example
/// ```ignore
/// use futures::StreamExt;
/// use streamprobe::decoder::FramingMode;
/// use streamprobe::sse::EventStreamExt;
///
/// let response = client.post(url).send().await?;
///
/// let mut events = Box::pin(response.render_events(FramingMode::Sse));
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// ```
pub trait EventStreamExt {
    /// Convert the response body into a stream of [`RenderEvent`]s.
    ///
    /// The stream ends after the first [`RenderEvent::Done`].
    fn render_events(
        self,
        mode: FramingMode,
    ) -> impl Stream<Item = Result<RenderEvent, ClientError>> + Send;
}

impl EventStreamExt for reqwest::Response {
    fn render_events(
        self,
        mode: FramingMode,
    ) -> impl Stream<Item = Result<RenderEvent, ClientError>> + Send {
        decode_stream(self.bytes_stream(), mode)
    }
}

/// Parse an SSE line to extract the data portion.
///
/// Only the literal `data: ` prefix is stripped; the remainder is returned as is.
///
/// # Example
/// ```
/// use streamprobe::sse::parse_sse_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"key\": \"value\"}"));
///
/// assert_eq!(parse_sse_line("event: message"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Check if an SSE data payload indicates the stream is done.
///
/// # Example
/// ```
/// use streamprobe::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(is_done_marker(" [DONE] "));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data.trim() == DONE_MARKER
}
