//! Amplitude HTTP API client for Rust.
//!
//! A thin layer over the Amplitude ingestion endpoints: events are sent as
//! gzip-compressed JSON batches, identify updates as form data. There is no
//! queueing, retry or response parsing; each call is one request.
//!
//! # Example
//!
//! ```rust,ignore
//! use amplitude::{Amplitude, Event};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), amplitude::Error> {
//!     let client = Amplitude::new("api_key");
//!
//!     client
//!         .send_events(&[
//!             Event::new("signup").user_id("u1").property("plan", "pro"),
//!             Event::new("login").user_id("u1"),
//!         ])
//!         .await?;
//!     Ok(())
//! }
//! ```

mod builders;
mod client;
mod codec;
mod config;
mod error;
mod transport;
pub mod types;

pub use client::Amplitude;
pub use config::{
    AmplitudeBuilder, Config, DEFAULT_EVENT_ENDPOINT, DEFAULT_EVENT_TIMEOUT,
    DEFAULT_IDENTIFY_ENDPOINT,
};
pub use error::Error;
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
pub use types::{Event, EventBatchRequest, Identify, Properties};
