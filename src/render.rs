//! Presentation sinks for decoded events and status updates.

use std::io::Write;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::RenderEvent;

/// Separator written after each pretty-printed JSON document.
pub const JSON_SEPARATOR: &str = "\n\n---\n\n";

/// Kind of a status update, mirroring a loading/success/error indicator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

/// A one-line status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub message: String,
    pub kind: StatusKind,
}

impl Status {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Loading,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Error,
        }
    }
}

/// Receiver of everything a probe run wants to show.
pub trait RenderSink {
    /// Replace the current status line.
    fn status(&mut self, status: &Status);

    /// Append one decoded event to the output.
    fn render(&mut self, event: &RenderEvent);
}

/// Format an event the way it is appended to the output log.
///
/// JSON is pretty-printed with two-space indentation and followed by a
/// separator; text is followed by a newline; `Done` produces nothing.
pub fn format_event(event: &RenderEvent) -> String {
    match event {
        RenderEvent::Json(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!("{}{}", pretty, JSON_SEPARATOR)
        }
        RenderEvent::Text(text) => format!("{}\n", text),
        RenderEvent::Done => String::new(),
    }
}

/// Sink writing events to a terminal (or any writer), statuses to a second writer.
pub struct ConsoleSink<W: Write, S: Write> {
    out: W,
    status_out: S,
    color: bool,
}

impl ConsoleSink<std::io::Stdout, std::io::Stderr> {
    /// Events on stdout, statuses on stderr.
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<W: Write, S: Write> ConsoleSink<W, S> {
    pub fn new(out: W, status_out: S) -> Self {
        Self {
            out,
            status_out,
            color: false,
        }
    }

    /// Colour status lines by kind.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write free-form text to the event output.
    pub fn write_text(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write output");
        }
    }

    pub fn into_inner(self) -> (W, S) {
        (self.out, self.status_out)
    }
}

impl<W: Write, S: Write> RenderSink for ConsoleSink<W, S> {
    fn status(&mut self, status: &Status) {
        let line = if self.color {
            match status.kind {
                StatusKind::Loading => status.message.yellow().to_string(),
                StatusKind::Success => status.message.green().to_string(),
                StatusKind::Error => status.message.red().bold().to_string(),
            }
        } else {
            status.message.clone()
        };

        if let Err(e) = writeln!(self.status_out, "{}", line) {
            warn!(error = %e, "failed to write status");
        }
    }

    fn render(&mut self, event: &RenderEvent) {
        let text = format_event(event);
        if !text.is_empty() {
            self.write_text(&text);
        }
    }
}

/// One entry recorded by [`EventLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Status(Status),
    Event(RenderEvent),
}

/// In-memory sink that records everything in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, without statuses.
    pub fn events(&self) -> Vec<&RenderEvent> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Event(event) => Some(event),
                LogEntry::Status(_) => None,
            })
            .collect()
    }

    /// Recorded statuses, without events.
    pub fn statuses(&self) -> Vec<&Status> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Status(status) => Some(status),
                LogEntry::Event(_) => None,
            })
            .collect()
    }

    /// The most recent status, as a status line would show it.
    pub fn last_status(&self) -> Option<&Status> {
        self.statuses().last().copied()
    }
}

impl RenderSink for EventLog {
    fn status(&mut self, status: &Status) {
        self.entries.push(LogEntry::Status(status.clone()));
    }

    fn render(&mut self, event: &RenderEvent) {
        self.entries.push(LogEntry::Event(event.clone()));
    }
}
