//! Request body encoding.

use crate::types::{Event, EventBatchRequest, Identify};
use crate::Error;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Serialize a batch to JSON and gzip it.
pub(crate) fn encode_events(api_key: &str, events: &[Event]) -> Result<Vec<u8>, Error> {
    let request = EventBatchRequest { api_key, events };
    let json = serde_json::to_vec(&request)?;
    gzip(&json)
}

/// Encode an identify update as an `application/x-www-form-urlencoded` body.
///
/// The identify record travels as a JSON string in the `identification` field.
pub(crate) fn encode_identify(api_key: &str, identify: &Identify) -> Result<Vec<u8>, Error> {
    let identification = serde_json::to_string(identify)?;
    let form = serde_urlencoded::to_string([
        ("api_key", api_key),
        ("identification", identification.as_str()),
    ])?;
    Ok(form.into_bytes())
}

fn gzip(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;
    encoder.finish().map_err(Error::Compression)
}
