//! Data models shared by the decoder, the client and the front-end.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single renderable item produced by the stream decoder.
///
/// Serialises as `{"kind": "json", "value": ...}`, `{"kind": "text", "value": ...}`
/// or `{"kind": "done"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RenderEvent {
    /// A line (or SSE `data:` payload) that parsed as a JSON document.
    Json(Value),

    /// A line that is not JSON, passed through unchanged.
    Text(String),

    /// End of stream, either a `[DONE]` marker or the transport closing.
    Done,
}

impl RenderEvent {
    /// Returns `true` for the terminal [`RenderEvent::Done`] event.
    pub fn is_done(&self) -> bool {
        matches!(self, RenderEvent::Done)
    }
}

/// A conversation session on the remote agent engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
}

/// Input for one streamed query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamQuery {
    pub user_id: String,
    pub session_id: String,
    pub message: String,
}

impl StreamQuery {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            message: message.into(),
        }
    }
}

// --- Agent engine wire types ---

/// Remote method selector sent as `class_method`.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ClassMethod {
    AsyncCreateSession,
    AsyncStreamQuery,
}

/// Request envelope: `{"class_method": ..., "input": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct EngineRequest<I> {
    pub class_method: ClassMethod,
    pub input: I,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateSessionInput<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StreamQueryInput<'a> {
    pub user_id: &'a str,
    pub session_id: &'a str,
    pub message: &'a str,
}

impl<'a> From<&'a StreamQuery> for EngineRequest<StreamQueryInput<'a>> {
    fn from(query: &'a StreamQuery) -> Self {
        EngineRequest {
            class_method: ClassMethod::AsyncStreamQuery,
            input: StreamQueryInput {
                user_id: &query.user_id,
                session_id: &query.session_id,
                message: &query.message,
            },
        }
    }
}

impl<'a> EngineRequest<CreateSessionInput<'a>> {
    pub fn create_session(user_id: &'a str) -> Self {
        EngineRequest {
            class_method: ClassMethod::AsyncCreateSession,
            input: CreateSessionInput { user_id },
        }
    }
}

/// Response to `async_create_session`: `{"output": {"id": ...}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CreateSessionResponse {
    #[serde(default)]
    pub output: Option<CreateSessionOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CreateSessionOutput {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreateSessionResponse {
    /// The new session id, if the engine returned a non-empty one.
    pub fn session_id(self) -> Option<String> {
        self.output
            .and_then(|output| output.id)
            .filter(|id| !id.is_empty())
    }
}
