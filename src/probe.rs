//! Session and send workflow behind the front-end.
//!
//! A [`Probe`] owns the client, the configuration and the current session for
//! one interactive run. Each send reports its progress to a [`RenderSink`].

use futures::StreamExt;
use tracing::{info, warn};

use crate::client::{ClientError, StreamingClient};
use crate::model::{RenderEvent, Session, StreamQuery};
use crate::options::ProbeOptions;
use crate::render::{RenderSink, Status};

/// Counts of what one send rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub json: usize,
    pub text: usize,
    pub completed: bool,
}

/// Send/session state for one front-end run.
///
/// # Example
/// ```ignore
/// let options = ProbeOptions::new(endpoint).with_require_session(true);
/// let client = AgentEngineClient::new(options.transport(token));
/// let mut probe = Probe::new(client, options);
///
/// let mut sink = ConsoleSink::stdio();
/// probe.create_session("user-1", &mut sink).await?;
/// probe.send_message("Hello", &mut sink).await?;
/// ```
pub struct Probe<C: StreamingClient> {
    client: C,
    options: ProbeOptions,
    session: Option<Session>,
    user_id: String,
    session_id: String,
}

impl<C: StreamingClient> Probe<C> {
    pub fn new(client: C, options: ProbeOptions) -> Self {
        Self {
            client,
            options,
            session: None,
            user_id: String::new(),
            session_id: String::new(),
        }
    }

    /// User id sent when no session has been created.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Session id sent when no session has been created.
    ///
    /// A non-empty id also satisfies `require_session`.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Adopt an existing session, e.g. one created in an earlier run.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Forget the current session.
    pub fn reset_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Create a session for `user_id` and make it current.
    ///
    /// On failure the previous session, if any, is kept.
    pub async fn create_session(
        &mut self,
        user_id: &str,
        sink: &mut impl RenderSink,
    ) -> Result<&Session, ClientError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(reject(sink, "Please enter a user ID"));
        }

        sink.status(&Status::loading("Creating session..."));
        match self.client.create_session(user_id).await {
            Ok(session) => {
                sink.status(&Status::success(format!(
                    "Session created: {}",
                    session.session_id
                )));
                Ok(self.session.insert(session))
            }
            Err(e) => Err(fail(sink, e)),
        }
    }

    /// Send `message` and render the streamed response into `sink`.
    ///
    /// Transport failures end the send: an error status and an error line
    /// are rendered and the error is returned.
    pub async fn send_message(
        &mut self,
        message: &str,
        sink: &mut impl RenderSink,
    ) -> Result<StreamSummary, ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(reject(sink, "Please enter a message"));
        }

        let query = match &self.session {
            Some(session) => StreamQuery::new(&session.user_id, &session.session_id, message),
            None if self.options.require_session && self.session_id.trim().is_empty() => {
                return Err(reject(sink, "Please create a session first"));
            }
            None => StreamQuery::new(&self.user_id, &self.session_id, message),
        };

        sink.status(&Status::loading("Sending request..."));
        let mut events = match self.client.stream_query(query).await {
            Ok(events) => events,
            Err(e) => return Err(fail(sink, e)),
        };

        sink.status(&Status::loading("Receiving streaming response..."));
        let mut summary = StreamSummary::default();
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    match &event {
                        RenderEvent::Json(_) => summary.json += 1,
                        RenderEvent::Text(_) => summary.text += 1,
                        RenderEvent::Done => summary.completed = true,
                    }
                    sink.render(&event);
                    if event.is_done() {
                        sink.status(&Status::success("Stream completed"));
                    }
                }
                Err(e) => return Err(fail(sink, e)),
            }
        }

        info!(
            json = summary.json,
            text = summary.text,
            completed = summary.completed,
            "stream finished"
        );
        Ok(summary)
    }
}

fn reject(sink: &mut impl RenderSink, message: &str) -> ClientError {
    sink.status(&Status::error(message));
    ClientError::Validation(message.to_string())
}

fn fail(sink: &mut impl RenderSink, error: ClientError) -> ClientError {
    warn!(error = %error, "request failed");
    sink.status(&Status::error(format!("Error: {}", error)));
    sink.render(&RenderEvent::Text(format!("Error occurred: {}", error)));
    error
}
