//! Consumption loop: drives a [`StreamDecoder`] from a chunked byte stream.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tracing::debug;

use crate::client::ClientError;
use crate::decoder::{FramingMode, StreamDecoder};
use crate::model::RenderEvent;

struct DecodeState<S> {
    byte_stream: std::pin::Pin<Box<S>>,
    decoder: StreamDecoder,
    queued: VecDeque<RenderEvent>,
    finished: bool,
}

/// Decode a byte stream into render events.
///
/// Chunks are fed in arrival order. The stream ends right after the first
/// [`RenderEvent::Done`], whether it came from a `[DONE]` marker (the
/// transport is dropped at that point) or from the transport closing. A
/// transport error is yielded once and ends the stream.
///
/// # Example
/// ```
/// use bytes::Bytes;
/// use futures::{stream, StreamExt};
/// use streamprobe::client::ClientError;
/// use streamprobe::decoder::FramingMode;
/// use streamprobe::model::RenderEvent;
/// use streamprobe::stream::decode_stream;
///
/// # tokio_test_block_on(async {
/// let chunks = stream::iter(vec![
///     Ok::<_, ClientError>(Bytes::from_static(b"{\"y\":2}\n{\"z\"")),
///     Ok(Bytes::from_static(b":3}\n")),
/// ]);
/// let events: Vec<_> = decode_stream(chunks, FramingMode::JsonLines)
///     .map(|event| event.unwrap())
///     .collect()
///     .await;
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[2], RenderEvent::Done);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub fn decode_stream<S, E>(
    byte_stream: S,
    mode: FramingMode,
) -> impl Stream<Item = Result<RenderEvent, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError>,
{
    let state = DecodeState {
        byte_stream: Box::pin(byte_stream),
        decoder: StreamDecoder::new(mode),
        queued: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.queued.pop_front() {
                return Some((Ok(event), state));
            }

            if state.finished {
                return None;
            }

            match state.byte_stream.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.feed(&chunk);
                    state.queued.extend(events);

                    if state.decoder.is_done() {
                        debug!("stream terminated by done marker");
                        state.finished = true;
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    debug!("byte stream ended");
                    state.queued.extend(state.decoder.finish());
                    state.finished = true;
                }
            }
        }
    })
}
