//! Error types for the Amplitude client.

use std::time::Duration;

/// Errors that can occur when sending to Amplitude.
///
/// HTTP status codes are never reported here: any response the service
/// returns, including 4xx and 5xx, counts as a completed call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, DNS, TLS or reqwest timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A caller-supplied transport failed.
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The request did not complete within the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Form encoding error.
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// Gzip compression of the request body failed.
    #[error("Compression error: {0}")]
    Compression(std::io::Error),
}

impl Error {
    /// Wrap an arbitrary error raised by a custom [`Transport`](crate::Transport).
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Transport(err.into())
    }

    /// Returns true if the request was cut off by a deadline, either the
    /// client's own or the HTTP client's.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}
