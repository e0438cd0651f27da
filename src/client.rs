//! Core client traits and error types.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::model::{RenderEvent, Session, StreamQuery};
use crate::options::TransportOptions;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The engine answered with a non-2xx status. Decoding never starts.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    /// Session creation succeeded on the wire but carried no `output.id`.
    #[error("Session creation response did not contain a session id")]
    MissingSessionId,

    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input, reported before any request is made.
    #[error("{0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boxed stream of decoded events returned by [`StreamingClient`].
pub type EventStream = BoxStream<'static, Result<RenderEvent, ClientError>>;

/// Client for an agent engine that manages sessions.
///
/// Implementations provide a static `create_session_request` that takes
/// explicit transport options; the instance method `create_session` uses
/// the options stored in the client.
///
/// # Example
/// ```rust,ignore
/// pub struct MyClient {
///     transport_options: TransportOptions<MyTransport>,
/// }
///
/// impl Client for MyClient {
///     type TransportProvider = MyTransport;
///
///     async fn create_session_request(
///         user_id: &str,
///         transport_options: &TransportOptions<Self::TransportProvider>,
///     ) -> Result<Session, ClientError> {
///         // Implementation
///     }
///
///     fn new(transport_options: TransportOptions<Self::TransportProvider>) -> Self {
///         Self { transport_options }
///     }
///
///     fn transport_options(&self) -> &TransportOptions<Self::TransportProvider> {
///         &self.transport_options
///     }
/// }
/// ```
#[async_trait]
pub trait Client: Send + Sync + Sized {
    /// Transport-specific options type.
    type TransportProvider: Send + Sync;

    /// Create a session for `user_id` using explicit transport options.
    async fn create_session_request(
        user_id: &str,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<Session, ClientError>;

    /// Create a new client instance with the given options.
    fn new(transport_options: TransportOptions<Self::TransportProvider>) -> Self;

    /// Get reference to the transport options field.
    fn transport_options(&self) -> &TransportOptions<Self::TransportProvider>;

    /// Create a session using the stored transport options.
    async fn create_session(&self, user_id: &str) -> Result<Session, ClientError> {
        Self::create_session_request(user_id, self.transport_options()).await
    }
}

/// Extension trait for streaming queries.
///
/// Transport failures (connection errors, non-2xx status) are returned from
/// the outer `Result` before any event is decoded.
#[async_trait]
pub trait StreamingClient: Client {
    /// Send a query with explicit transport options and stream the decoded response.
    async fn request_stream(
        query: StreamQuery,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<EventStream, ClientError>;

    /// Send a query using the stored transport options.
    async fn stream_query(&self, query: StreamQuery) -> Result<EventStream, ClientError> {
        Self::request_stream(query, <Self as Client>::transport_options(self)).await
    }
}
