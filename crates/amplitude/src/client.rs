//! Amplitude client implementation.

use crate::codec;
use crate::config::{AmplitudeBuilder, Config};
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{Event, Identify};
use crate::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Amplitude HTTP API client.
///
/// Every call is one independent request/response exchange. The status
/// code of the response is not inspected: a 4xx or 5xx reply from the
/// service is reported as success. Callers own retry and backoff.
///
/// # Example
///
/// ```rust,no_run
/// use amplitude::{Amplitude, Event, Identify};
///
/// #[tokio::main]
/// async fn main() -> Result<(), amplitude::Error> {
///     let client = Amplitude::new("api_key");
///
///     client
///         .send_event(&Event::new("login").user_id("u1").timestamp_now())
///         .await?;
///
///     client
///         .identify(&Identify::for_user("u1").user_property("plan", "pro"))
///         .await?;
///     Ok(())
/// }
/// ```
pub struct Amplitude {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl Amplitude {
    /// Create a client with the default endpoints and transport.
    ///
    /// Performs no I/O.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_parts(Config::new(api_key), Arc::new(HttpTransport::default()))
    }

    /// Create a new builder with the given API key.
    pub fn builder(api_key: impl Into<String>) -> AmplitudeBuilder {
        AmplitudeBuilder::new(api_key)
    }

    pub(crate) fn from_parts(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the transport used for all subsequent requests.
    pub fn set_transport(&mut self, transport: impl Transport + 'static) {
        self.transport = Arc::new(transport);
    }

    // ============================================
    // EVENTS
    // ============================================

    /// Send a batch of events in one gzip-compressed request.
    ///
    /// Events are submitted in slice order. The request is bounded by the
    /// event timeout (5 seconds by default); when it elapses the call fails
    /// with [`Error::Timeout`].
    #[instrument(skip_all, fields(event_count = events.len()))]
    pub async fn send_events(&self, events: &[Event]) -> Result<(), Error> {
        let body = codec::encode_events(&self.config.api_key, events)?;
        let timeout = self.config.event_timeout;

        let request = TransportRequest::post(&self.config.event_endpoint, body)
            .header("content-type", "application/json")
            .header("content-encoding", "gzip")
            .timeout(Some(timeout));

        self.execute(request).await
    }

    /// Send a single event. Same wire format as a batch of one.
    pub async fn send_event(&self, event: &Event) -> Result<(), Error> {
        self.send_events(std::slice::from_ref(event)).await
    }

    // ============================================
    // IDENTIFY
    // ============================================

    /// Send a user identity update as form data.
    ///
    /// Not compressed. Unbounded unless an identify timeout was configured
    /// or the transport applies its own.
    #[instrument(skip_all)]
    pub async fn identify(&self, identify: &Identify) -> Result<(), Error> {
        let body = codec::encode_identify(&self.config.api_key, identify)?;

        let request = TransportRequest::post(&self.config.identify_endpoint, body)
            .header("content-type", "application/x-www-form-urlencoded")
            .timeout(self.config.identify_timeout);

        self.execute(request).await
    }

    // ============================================
    // INTERNAL
    // ============================================

    async fn execute(&self, request: TransportRequest) -> Result<(), Error> {
        debug!(
            endpoint = %request.url,
            bytes = request.body.len(),
            "sending request"
        );

        let deadline = request.timeout;
        let response = match deadline {
            Some(limit) => send_with_deadline(self.transport.as_ref(), request, limit).await?,
            None => self.transport.send(request).await?,
        };

        debug!(status = response.status, "request completed");
        Ok(())
    }
}

async fn send_with_deadline(
    transport: &dyn Transport,
    request: TransportRequest,
    limit: Duration,
) -> Result<TransportResponse, Error> {
    tokio::time::timeout(limit, transport.send(request))
        .await
        .map_err(|_| Error::Timeout(limit))?
}

impl std::fmt::Debug for Amplitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Amplitude")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::sync::Mutex;

    /// Transport that records requests and answers with a fixed status.
    #[derive(Clone)]
    struct RecordingTransport {
        requests: Arc<Mutex<Vec<TransportRequest>>>,
        status: u16,
        delay: Option<Duration>,
    }

    impl RecordingTransport {
        fn new(status: u16) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                status,
                delay: None,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(200)
            }
        }

        fn take(&self) -> Vec<TransportRequest> {
            std::mem::take(&mut *self.requests.lock().unwrap())
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(TransportResponse {
                status: self.status,
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, Error> {
            Err(Error::transport("connection refused"))
        }
    }

    fn client_with(transport: impl Transport + 'static) -> Amplitude {
        let mut client = Amplitude::new("k1");
        client.set_transport(transport);
        client
    }

    fn gunzip(data: &[u8]) -> String {
        let mut out = String::new();
        GzDecoder::new(data).read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_new_uses_default_endpoints() {
        let client = Amplitude::new("k1");

        assert_eq!(client.config().api_key(), "k1");
        assert_eq!(
            client.config().event_endpoint(),
            "https://api2.amplitude.com/2/httpapi"
        );
        assert_eq!(
            client.config().identify_endpoint(),
            "https://api.amplitude.com/identify"
        );
    }

    #[tokio::test]
    async fn test_send_event_login_scenario() {
        let transport = RecordingTransport::new(200);
        let client = client_with(transport.clone());

        client
            .send_event(&Event {
                event_type: Some("login".into()),
                user_id: Some("u1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let requests = transport.take();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "https://api2.amplitude.com/2/httpapi");
        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(request.header_value("content-encoding"), Some("gzip"));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            gunzip(&request.body),
            r#"{"api_key":"k1","events":[{"event_type":"login","user_id":"u1"}]}"#
        );
    }

    #[tokio::test]
    async fn test_send_event_matches_singleton_batch() {
        let transport = RecordingTransport::new(200);
        let client = client_with(transport.clone());
        let event = Event::new("purchase").user_id("u1").revenue(12.5);

        client.send_event(&event).await.unwrap();
        client.send_events(&[event]).await.unwrap();

        let requests = transport.take();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_send_events_preserves_order() {
        let transport = RecordingTransport::new(200);
        let client = client_with(transport.clone());
        let events: Vec<Event> = (0..20).map(|i| Event::new(format!("e{}", i))).collect();

        client.send_events(&events).await.unwrap();

        let body: serde_json::Value =
            serde_json::from_str(&gunzip(&transport.take()[0].body)).unwrap();
        let sent = body["events"].as_array().unwrap();
        assert_eq!(sent.len(), events.len());
        for (i, event) in sent.iter().enumerate() {
            assert_eq!(event["event_type"], format!("e{}", i));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_events_times_out_after_five_seconds() {
        let client = client_with(RecordingTransport::slow(Duration::from_secs(30)));
        let started = tokio::time::Instant::now();

        let err = client.send_event(&Event::new("slow")).await.unwrap_err();

        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(5)));
        assert!(err.is_timeout());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_millis(5100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_identify_has_no_default_deadline() {
        let transport = RecordingTransport::slow(Duration::from_secs(30));
        let client = client_with(transport.clone());

        client.identify(&Identify::for_user("u1")).await.unwrap();

        assert_eq!(transport.take()[0].timeout, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identify_timeout_when_configured() {
        let client = Amplitude::builder("k1")
            .identify_timeout(Duration::from_secs(1))
            .transport(RecordingTransport::slow(Duration::from_secs(30)))
            .build()
            .unwrap();

        let err = client.identify(&Identify::for_user("u1")).await.unwrap_err();

        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_non_success_status_reports_ok() {
        let transport = RecordingTransport::new(500);
        let client = client_with(transport.clone());

        client.send_event(&Event::new("login")).await.unwrap();
        client.identify(&Identify::for_user("u1")).await.unwrap();

        assert_eq!(transport.take().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = client_with(FailingTransport);

        let err = client.send_event(&Event::new("login")).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        let err = client.identify(&Identify::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[tokio::test]
    async fn test_unserializable_event_never_reaches_transport() {
        let transport = RecordingTransport::new(200);
        let client = client_with(transport.clone());

        let err = client
            .send_event(&Event::new("purchase").price(f64::NAN))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Serialization(_)));
        assert!(transport.take().is_empty());
    }

    #[tokio::test]
    async fn test_identify_scenario() {
        let transport = RecordingTransport::new(200);
        let client = client_with(transport.clone());

        client
            .identify(&Identify {
                user_id: Some("u1".into()),
                platform: Some("ios".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let request = transport.take().remove(0);
        assert_eq!(request.url, "https://api.amplitude.com/identify");
        assert_eq!(
            request.header_value("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.header_value("content-encoding"), None);
        assert_eq!(
            String::from_utf8(request.body).unwrap(),
            "api_key=k1&identification=%7B%22platform%22%3A%22ios%22%2C%22user_id%22%3A%22u1%22%7D"
        );
    }

    #[tokio::test]
    async fn test_builder_endpoints_are_used() {
        let transport = RecordingTransport::new(200);
        let client = Amplitude::builder("k1")
            .event_endpoint("http://localhost/events")
            .identify_endpoint("http://localhost/identify")
            .transport(transport.clone())
            .build()
            .unwrap();

        client.send_event(&Event::new("login")).await.unwrap();
        client.identify(&Identify::new()).await.unwrap();

        let requests = transport.take();
        assert_eq!(requests[0].url, "http://localhost/events");
        assert_eq!(requests[1].url, "http://localhost/identify");
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Amplitude>();
    }
}
