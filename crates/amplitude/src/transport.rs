//! HTTP transport for sending requests to the Amplitude API.

use crate::Error;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A fully encoded POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Deadline for the whole exchange, if any.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub(crate) fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
            timeout: None,
        }
    }

    pub(crate) fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub(crate) fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the client learns from a completed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
}

/// Performs the network exchange for the client.
///
/// Replace the default [`HttpTransport`] with
/// [`Amplitude::set_transport`](crate::Amplitude::set_transport) to inject a
/// mock or customize connection behavior. Implementations must release the
/// response body before returning.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error>;
}

/// Transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport from a preconfigured reqwest client (proxies,
    /// connection pooling, default timeouts).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<reqwest::Client> for HttpTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();

        // Drain so the connection goes back to the pool in a clean state.
        let drained = response.bytes().await?;

        debug!(status = %status, body_len = drained.len(), "response received");

        Ok(TransportResponse {
            status: status.as_u16(),
        })
    }
}
