//! Generic JSON decoding shared by every resource type.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DecodeError;
use crate::http::Response;

/// Deserialize `payload` into `T`.
pub fn decode_bytes<T: DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Drain the body of `response` and deserialize it into `T`.
///
/// The response (and its body reader) is consumed, so it is released
/// whether reading or decoding fails.
pub fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, DecodeError> {
    let status = response.status;
    let body = response.bytes()?;
    debug!(%status, len = body.len(), "decoding response body");
    decode_bytes(&body)
}
