//! Probe configuration and transport options.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;
use crate::decoder::FramingMode;

/// A secret string type for sensitive data like access tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Front-end configuration.
///
/// Covers the differences between deployments: whether the endpoint is fixed
/// or user-supplied, whether a session must be created before sending, and
/// whether the token/endpoint pair is remembered between runs.
///
/// # Example
/// ```rust
/// use streamprobe::decoder::FramingMode;
/// use streamprobe::options::ProbeOptions;
///
/// let options = ProbeOptions::new("https://example.com/v1/reasoningEngines/42")
///     .with_framing(FramingMode::JsonLines)
///     .with_require_session(true);
/// assert!(options.require_session);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeOptions {
    /// Agent engine resource URL
    pub endpoint_base: Option<String>,

    /// How the streamed response body is framed
    pub framing: FramingMode,

    /// Require a session to be created before a message can be sent
    pub require_session: bool,

    /// Remember the access token and endpoint between runs
    pub persist_credentials: bool,
}

impl ProbeOptions {
    pub fn new(endpoint_base: impl Into<String>) -> Self {
        Self {
            endpoint_base: Some(endpoint_base.into()),
            ..Self::default()
        }
    }

    /// Set the framing mode.
    pub fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }

    /// Set whether a session is required before sending.
    pub fn with_require_session(mut self, require_session: bool) -> Self {
        self.require_session = require_session;
        self
    }

    /// Set whether credentials are persisted.
    pub fn with_persist_credentials(mut self, persist_credentials: bool) -> Self {
        self.persist_credentials = persist_credentials;
        self
    }

    /// Build HTTP transport options for these settings and an access token.
    pub fn transport(&self, access_token: impl Into<SecretString>) -> TransportOptions<HttpTransport> {
        let mut provider = HttpTransport::new(access_token).with_framing(self.framing);
        provider.endpoint = self.endpoint_base.clone();
        TransportOptions::new(provider)
    }
}

/// Generic transport options containing truly generic transport fields
/// and transport-specific configuration.
///
/// # Type Parameters
/// - `T`: Transport-specific options type
#[derive(Debug, Clone)]
pub struct TransportOptions<T> {
    /// Request timeout (applies to all transports)
    pub timeout: Option<Duration>,

    /// Transport-specific options
    pub provider: T,
}

impl<T> TransportOptions<T> {
    /// Create new transport options with transport-specific configuration.
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP-specific transport options.
/// Used as the provider field in `TransportOptions<HttpTransport>`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    /// Bearer token for authentication
    pub access_token: Option<SecretString>,

    /// Agent engine resource URL
    pub endpoint: Option<String>,

    /// Response body framing
    pub framing: FramingMode,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpTransport {
    /// Create new HTTP transport options with an access token.
    pub fn new(access_token: impl Into<SecretString>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the framing mode.
    pub fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }

    /// Resolved URLs for the configured endpoint.
    pub fn endpoints(&self) -> Result<EngineEndpoints, ClientError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ClientError::Config("Endpoint is required".to_string()))?;
        EngineEndpoints::new(endpoint, self.framing)
    }
}

/// Method URLs derived from an agent engine resource URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoints {
    /// `{base}:query`, used for session creation
    pub query: String,

    /// `{base}:streamQuery`, with `?alt=sse` in SSE mode
    pub stream_query: String,
}

impl EngineEndpoints {
    /// Derive method URLs from `endpoint`.
    ///
    /// A pasted method URL such as `.../reasoningEngines/1:streamQuery?alt=sse`
    /// is reduced to its resource base first.
    ///
    /// # Example
    /// ```
    /// use streamprobe::decoder::FramingMode;
    /// use streamprobe::options::EngineEndpoints;
    ///
    /// let urls = EngineEndpoints::new(
    ///     "https://host/v1/reasoningEngines/7:streamQuery?alt=sse",
    ///     FramingMode::Sse,
    /// )
    /// .unwrap();
    /// assert_eq!(urls.query, "https://host/v1/reasoningEngines/7:query");
    /// assert_eq!(urls.stream_query, "https://host/v1/reasoningEngines/7:streamQuery?alt=sse");
    /// ```
    pub fn new(endpoint: &str, framing: FramingMode) -> Result<Self, ClientError> {
        let base = resource_base(endpoint);
        if base.is_empty() {
            return Err(ClientError::Config("Endpoint is empty".to_string()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "Endpoint must be an http(s) URL: {}",
                base
            )));
        }

        let stream_query = match framing {
            FramingMode::Sse => format!("{}:streamQuery?alt=sse", base),
            FramingMode::JsonLines => format!("{}:streamQuery", base),
        };

        Ok(Self {
            query: format!("{}:query", base),
            stream_query,
        })
    }
}

fn resource_base(endpoint: &str) -> &str {
    let endpoint = endpoint.trim();
    let endpoint = endpoint.split(['?', '#']).next().unwrap_or(endpoint);
    let endpoint = endpoint.trim_end_matches('/');
    [":streamQuery", ":query"]
        .iter()
        .find_map(|suffix| endpoint.strip_suffix(suffix))
        .unwrap_or(endpoint)
}
