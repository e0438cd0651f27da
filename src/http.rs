//! HTTP client utilities for making requests to the agent engine.
//!
//! This module provides reusable HTTP client construction and
//! request building logic.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::client::ClientError;
use crate::decoder::FramingMode;
use crate::options::{HttpTransport, TransportOptions};

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies. An
/// unparseable proxy URL is a [`ClientError::Config`].
///
/// # Example
/// ```ignore
/// let client = build_http_client(&transport_options)?;
/// ```
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| {
            ClientError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Start an authenticated JSON POST to `url`.
///
/// Adds the bearer token, the JSON content type, `Accept: text/event-stream`
/// in SSE mode, and any extra headers.
pub fn engine_post(
    http_client: &Client,
    url: &str,
    transport: &HttpTransport,
) -> Result<RequestBuilder, ClientError> {
    let access_token = transport
        .access_token
        .as_ref()
        .filter(|token| !token.expose_secret().is_empty())
        .ok_or_else(|| ClientError::Config("Access token is required".to_string()))?;

    let mut req = http_client
        .post(url)
        .header(
            AUTHORIZATION,
            format!("Bearer {}", access_token.expose_secret()),
        )
        .header(CONTENT_TYPE, "application/json");

    if transport.framing == FramingMode::Sse {
        req = req.header(ACCEPT, "text/event-stream");
    }

    Ok(add_extra_headers(req, &transport.extra_headers))
}

/// Add extra headers to a request if specified in transport options.
///
/// # Example
/// ```ignore
/// let mut req = client.post(url);
/// req = add_extra_headers(req, &transport_options.provider.extra_headers);
/// ```
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
