//! Incremental decoder turning raw body chunks into [`RenderEvent`]s.
//!
//! Chunk boundaries carry no meaning: bytes are reassembled into UTF-8 text,
//! split on `\n`, and every complete line is classified before the next chunk
//! is accepted. The trailing partial line stays in the buffer until more bytes
//! arrive, and is dropped by [`StreamDecoder::finish`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::RenderEvent;
use crate::sse::{is_done_marker, parse_sse_line};

/// How complete lines are classified.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// `data: ` lines carry payloads, `data: [DONE]` ends the stream,
    /// every other line is passed through as text.
    #[default]
    Sse,

    /// Every line is a standalone JSON document.
    JsonLines,
}

/// Decoder state for one stream.
///
/// # Example
/// ```
/// use serde_json::json;
/// use streamprobe::decoder::{FramingMode, StreamDecoder};
/// use streamprobe::model::RenderEvent;
///
/// let mut decoder = StreamDecoder::new(FramingMode::Sse);
/// assert!(decoder.feed(b"data: {\"x\":").is_empty());
/// assert_eq!(decoder.feed(b"1}\n"), vec![RenderEvent::Json(json!({"x": 1}))]);
/// assert_eq!(decoder.finish(), vec![RenderEvent::Done]);
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    mode: FramingMode,
    /// Text after the last `\n`, awaiting more bytes.
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    done: bool,
}

impl StreamDecoder {
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether a `[DONE]` marker has been seen. Further input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one chunk and return the events for every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RenderEvent> {
        if self.done {
            trace!(len = chunk.len(), "ignoring chunk after done marker");
            return Vec::new();
        }

        let text = self.decode_utf8(chunk);
        self.buffer.push_str(&text);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut events = Vec::new();
        for line in complete.split_terminator('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }

            let event = self.classify(line);
            let done = event.is_done();
            events.push(event);

            if done {
                debug!("done marker received");
                self.done = true;
                self.buffer.clear();
                self.pending.clear();
                break;
            }
        }

        debug!(
            chunk_len = chunk.len(),
            events = events.len(),
            buffered = self.buffer.len(),
            "decoded chunk"
        );
        events
    }

    /// Signal end of input.
    ///
    /// Any unterminated trailing line is discarded rather than flushed. Always
    /// returns exactly one [`RenderEvent::Done`].
    pub fn finish(&mut self) -> Vec<RenderEvent> {
        if !self.buffer.is_empty() || !self.pending.is_empty() {
            debug!(
                buffered = self.buffer.len(),
                pending_bytes = self.pending.len(),
                "discarding unterminated input at end of stream"
            );
        }
        self.buffer.clear();
        self.pending.clear();
        self.done = true;
        vec![RenderEvent::Done]
    }

    fn classify(&self, line: &str) -> RenderEvent {
        match self.mode {
            FramingMode::Sse => match parse_sse_line(line) {
                Some(data) if is_done_marker(data) => RenderEvent::Done,
                Some(data) => parse_or_text(data),
                None => RenderEvent::Text(line.to_string()),
            },
            FramingMode::JsonLines => parse_or_text(line),
        }
    }

    /// Decode bytes as UTF-8, holding back an incomplete trailing sequence.
    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        text
    }
}

fn parse_or_text(data: &str) -> RenderEvent {
    match serde_json::from_str(data) {
        Ok(value) => RenderEvent::Json(value),
        Err(_) => RenderEvent::Text(data.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed_all(mode: FramingMode, chunks: &[&[u8]]) -> Vec<RenderEvent> {
        let mut decoder = StreamDecoder::new(mode);
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_sse_json_line() {
        let events = feed_all(FramingMode::Sse, &[b"data: {\"a\":1}\n"]);
        assert_eq!(
            events,
            vec![RenderEvent::Json(json!({"a": 1})), RenderEvent::Done]
        );
    }

    #[test]
    fn test_sse_split_json_across_chunks() {
        let events = feed_all(FramingMode::Sse, &[b"data: {\"x\":", b"1}\n"]);
        assert_eq!(
            events,
            vec![RenderEvent::Json(json!({"x": 1})), RenderEvent::Done]
        );
    }

    #[test]
    fn test_sse_non_json_data_is_text() {
        let mut decoder = StreamDecoder::new(FramingMode::Sse);
        let events = decoder.feed(b"data: not json\n");
        assert_eq!(events, vec![RenderEvent::Text("not json".to_string())]);
    }

    #[test]
    fn test_sse_other_fields_pass_through() {
        let mut decoder = StreamDecoder::new(FramingMode::Sse);
        let events = decoder.feed(b"event: message\nid: 3\n: keep-alive\ndata: 5\n");
        assert_eq!(
            events,
            vec![
                RenderEvent::Text("event: message".to_string()),
                RenderEvent::Text("id: 3".to_string()),
                RenderEvent::Text(": keep-alive".to_string()),
                RenderEvent::Json(json!(5)),
            ]
        );
    }

    #[test]
    fn test_sse_done_stops_processing() {
        let mut decoder = StreamDecoder::new(FramingMode::Sse);
        let events = decoder.feed(b"data: {\"a\":1}\ndata: [DONE]\ndata: {\"b\":2}\n");
        assert_eq!(
            events,
            vec![RenderEvent::Json(json!({"a": 1})), RenderEvent::Done]
        );
        assert!(decoder.is_done());
        assert!(decoder.feed(b"data: {\"c\":3}\n").is_empty());
    }

    #[test]
    fn test_json_lines_mode() {
        let events = feed_all(FramingMode::JsonLines, &[b"{\"y\":2}\n{\"z\":3}\n"]);
        assert_eq!(
            events,
            vec![
                RenderEvent::Json(json!({"y": 2})),
                RenderEvent::Json(json!({"z": 3})),
                RenderEvent::Done,
            ]
        );
    }

    #[test]
    fn test_json_lines_text_fallback() {
        let mut decoder = StreamDecoder::new(FramingMode::JsonLines);
        let events = decoder.feed(b"hello world\n");
        assert_eq!(events, vec![RenderEvent::Text("hello world".to_string())]);
    }

    #[test]
    fn test_json_lines_does_not_strip_data_prefix() {
        let mut decoder = StreamDecoder::new(FramingMode::JsonLines);
        let events = decoder.feed(b"data: {\"a\":1}\n");
        assert_eq!(
            events,
            vec![RenderEvent::Text("data: {\"a\":1}".to_string())]
        );
    }

    #[test]
    fn test_blank_lines_produce_nothing() {
        for mode in [FramingMode::Sse, FramingMode::JsonLines] {
            let mut decoder = StreamDecoder::new(mode);
            assert!(decoder.feed(b"\n\n   \n\t\r\n").is_empty());
        }
    }

    #[test]
    fn test_crlf_lines() {
        let mut decoder = StreamDecoder::new(FramingMode::Sse);
        let events = decoder.feed(b"event: ping\r\ndata: {\"a\":1}\r\n\r\n");
        assert_eq!(
            events,
            vec![
                RenderEvent::Text("event: ping".to_string()),
                RenderEvent::Json(json!({"a": 1})),
            ]
        );
    }

    #[test]
    fn test_finish_discards_partial_line() {
        let mut decoder = StreamDecoder::new(FramingMode::JsonLines);
        assert!(decoder.feed(b"{\"a\":1}").is_empty());
        assert_eq!(decoder.finish(), vec![RenderEvent::Done]);
        assert_eq!(decoder.finish(), vec![RenderEvent::Done]);
    }

    #[test]
    fn test_partial_line_is_held_between_chunks() {
        let mut decoder = StreamDecoder::new(FramingMode::JsonLines);
        assert_eq!(
            decoder.feed(b"{\"a\":1}\n{\"b\""),
            vec![RenderEvent::Json(json!({"a": 1}))]
        );
        assert_eq!(
            decoder.feed(b":2}\n"),
            vec![RenderEvent::Json(json!({"b": 2}))]
        );
    }

    #[test]
    fn test_utf8_split_inside_sequence() {
        let line = "data: {\"msg\":\"héllo ✓\"}\n".as_bytes();
        // Split inside the three-byte check mark.
        let split = line.iter().position(|&b| b == 0xE2).unwrap() + 1;
        let events = feed_all(FramingMode::Sse, &[&line[..split], &line[split..]]);
        assert_eq!(
            events,
            vec![RenderEvent::Json(json!({"msg": "héllo ✓"})), RenderEvent::Done]
        );
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement() {
        let mut decoder = StreamDecoder::new(FramingMode::JsonLines);
        let events = decoder.feed(b"ab\xFFcd\n");
        assert_eq!(events, vec![RenderEvent::Text("ab\u{FFFD}cd".to_string())]);
    }

    #[test]
    fn test_every_split_point_yields_same_events() {
        let input = "event: start\ndata: {\"t\":\"ünï\"}\n\ndata: plain\ndata: [1,2]\n\
                     data: [DONE]\ndata: {\"late\":true}\n"
            .as_bytes();
        let expected = feed_all(FramingMode::Sse, &[input]);
        assert_eq!(
            expected,
            vec![
                RenderEvent::Text("event: start".to_string()),
                RenderEvent::Json(json!({"t": "ünï"})),
                RenderEvent::Text("plain".to_string()),
                RenderEvent::Json(json!([1, 2])),
                RenderEvent::Done,
                RenderEvent::Done,
            ]
        );

        for i in 0..=input.len() {
            for j in i..=input.len() {
                let events = feed_all(FramingMode::Sse, &[&input[..i], &input[i..j], &input[j..]]);
                assert_eq!(events, expected, "split at {} and {}", i, j);
            }
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let input = b"{\"y\":2}\n{\"z\":3}\nnot json\n";
        let chunks: Vec<&[u8]> = input.chunks(1).collect();
        let events = feed_all(FramingMode::JsonLines, &chunks);
        assert_eq!(
            events,
            vec![
                RenderEvent::Json(json!({"y": 2})),
                RenderEvent::Json(json!({"z": 3})),
                RenderEvent::Text("not json".to_string()),
                RenderEvent::Done,
            ]
        );
    }
}
