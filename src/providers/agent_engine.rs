//! Agent engine (`reasoningEngines`) client implementation.
//!
//! Sessions are created with `async_create_session` on `{base}:query`;
//! messages are sent with `async_stream_query` on `{base}:streamQuery`.

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info};

use crate::client::{Client, ClientError, EventStream, StreamingClient};
use crate::http::{build_http_client, engine_post};
use crate::model::{CreateSessionResponse, EngineRequest, Session, StreamQuery};
use crate::options::{HttpTransport, TransportOptions};
use crate::sse::EventStreamExt;

/// Agent engine client using HTTP transport.
#[derive(Debug, Clone)]
pub struct AgentEngineClient {
    transport_options: TransportOptions<HttpTransport>,
}

impl AgentEngineClient {
    /// Create a new agent engine client.
    pub fn new(transport_options: TransportOptions<HttpTransport>) -> Self {
        Self { transport_options }
    }

    /// Turn a non-2xx response into a [`ClientError::Status`].
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "engine returned error status");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Client for AgentEngineClient {
    type TransportProvider = HttpTransport;

    async fn create_session_request(
        user_id: &str,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<Session, ClientError> {
        let transport = &transport_options.provider;
        let urls = transport.endpoints()?;

        let http_client = build_http_client(transport_options)?;
        let req = engine_post(&http_client, &urls.query, transport)?;

        debug!(url = %urls.query, user_id, "creating session");
        let response = req
            .json(&EngineRequest::create_session(user_id))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: CreateSessionResponse = response.json().await?;
        let session_id = body.session_id().ok_or(ClientError::MissingSessionId)?;

        info!(session_id = %session_id, user_id, "session created");
        Ok(Session {
            session_id,
            user_id: user_id.to_string(),
        })
    }

    fn new(transport_options: TransportOptions<Self::TransportProvider>) -> Self {
        Self { transport_options }
    }

    fn transport_options(&self) -> &TransportOptions<Self::TransportProvider> {
        &self.transport_options
    }
}

#[async_trait]
impl StreamingClient for AgentEngineClient {
    async fn request_stream(
        query: StreamQuery,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<EventStream, ClientError> {
        let transport = &transport_options.provider;
        let urls = transport.endpoints()?;

        let http_client = build_http_client(transport_options)?;
        let req = engine_post(&http_client, &urls.stream_query, transport)?;

        debug!(
            url = %urls.stream_query,
            user_id = %query.user_id,
            session_id = %query.session_id,
            "sending stream query"
        );
        let response = req.json(&EngineRequest::from(&query)).send().await?;
        let response = Self::check_status(response).await?;

        info!(status = response.status().as_u16(), framing = ?transport.framing, "receiving stream");
        Ok(response.render_events(transport.framing).boxed())
    }
}
