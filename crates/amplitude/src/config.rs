//! Client configuration.

use crate::client::Amplitude;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Default event ingestion endpoint.
pub const DEFAULT_EVENT_ENDPOINT: &str = "https://api2.amplitude.com/2/httpapi";

/// Default identify endpoint.
pub const DEFAULT_IDENTIFY_ENDPOINT: &str = "https://api.amplitude.com/identify";

/// Deadline for event submission, measured from request start.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Amplitude client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) api_key: String,
    pub(crate) event_endpoint: String,
    pub(crate) identify_endpoint: String,
    pub(crate) event_timeout: Duration,
    pub(crate) identify_timeout: Option<Duration>,
}

impl Config {
    pub(crate) fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            event_endpoint: DEFAULT_EVENT_ENDPOINT.into(),
            identify_endpoint: DEFAULT_IDENTIFY_ENDPOINT.into(),
            event_timeout: DEFAULT_EVENT_TIMEOUT,
            identify_timeout: None,
        }
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the event ingestion endpoint.
    pub fn event_endpoint(&self) -> &str {
        &self.event_endpoint
    }

    /// Get the identify endpoint.
    pub fn identify_endpoint(&self) -> &str {
        &self.identify_endpoint
    }

    /// Get the event submission deadline.
    pub fn event_timeout(&self) -> Duration {
        self.event_timeout
    }

    /// Get the identify deadline. `None` defers to the transport.
    pub fn identify_timeout(&self) -> Option<Duration> {
        self.identify_timeout
    }
}

/// Builder for the Amplitude client.
pub struct AmplitudeBuilder {
    api_key: String,
    event_endpoint: Option<String>,
    identify_endpoint: Option<String>,
    event_timeout: Option<Duration>,
    identify_timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl AmplitudeBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            event_endpoint: None,
            identify_endpoint: None,
            event_timeout: None,
            identify_timeout: None,
            transport: None,
        }
    }

    /// Set the event ingestion endpoint.
    pub fn event_endpoint(mut self, url: impl Into<String>) -> Self {
        self.event_endpoint = Some(url.into());
        self
    }

    /// Set the identify endpoint.
    pub fn identify_endpoint(mut self, url: impl Into<String>) -> Self {
        self.identify_endpoint = Some(url.into());
        self
    }

    /// Set the event submission deadline.
    pub fn event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = Some(timeout);
        self
    }

    /// Bound identify requests with a deadline.
    pub fn identify_timeout(mut self, timeout: Duration) -> Self {
        self.identify_timeout = Some(timeout);
        self
    }

    /// Use a custom transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the configuration.
    pub(crate) fn build_config(&self) -> Result<Config, crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::Config("api_key cannot be empty".into()));
        }
        if self.event_timeout == Some(Duration::ZERO) {
            return Err(crate::Error::Config("event_timeout must be non-zero".into()));
        }

        let mut config = Config::new(self.api_key.clone());
        if let Some(url) = &self.event_endpoint {
            config.event_endpoint = url.clone();
        }
        if let Some(url) = &self.identify_endpoint {
            config.identify_endpoint = url.clone();
        }
        config.event_timeout = self.event_timeout.unwrap_or(DEFAULT_EVENT_TIMEOUT);
        config.identify_timeout = self.identify_timeout;
        Ok(config)
    }

    /// Build the Amplitude client.
    pub fn build(self) -> Result<Amplitude, crate::Error> {
        let config = self.build_config()?;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::default()));
        Ok(Amplitude::from_parts(config, transport))
    }
}

impl std::fmt::Debug for AmplitudeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmplitudeBuilder")
            .field("api_key", &self.api_key)
            .field("event_endpoint", &self.event_endpoint)
            .field("identify_endpoint", &self.identify_endpoint)
            .field("event_timeout", &self.event_timeout)
            .field("identify_timeout", &self.identify_timeout)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
