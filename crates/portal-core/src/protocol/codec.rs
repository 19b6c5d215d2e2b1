//! JSON codec for the counters report and the auth server response.
//!
//! The encoder produces compact JSON (no whitespace); the decoders accept any
//! valid JSON with the expected shape.  Unknown fields are ignored so the auth
//! server can extend its replies without breaking older gateways.

use thiserror::Error;

use crate::protocol::messages::{AuthServerResponse, CounterReport};

/// Errors that can occur while encoding or decoding a counters document.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The outbound report could not be serialized.
    #[error("failed to encode counters report: {0}")]
    Encode(String),

    /// The inbound body is not JSON or does not have the expected shape
    /// (for example, the top-level `resp` array is missing).
    #[error("malformed auth server document: {0}")]
    Decode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`CounterReport`] as the request body for the counters stage.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.  With the plain
/// string and integer fields used here this does not happen in practice.
///
/// # Examples
///
/// ```rust
/// use portal_core::protocol::{encode_report, CounterReport};
///
/// let body = encode_report(&CounterReport::default()).unwrap();
/// assert_eq!(body, r#"{"counters":[]}"#);
/// ```
pub fn encode_report(report: &CounterReport) -> Result<String, ProtocolError> {
    serde_json::to_string(report).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes a counters report previously produced by [`encode_report`].
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if `body` is not a counters document.
pub fn decode_report(body: &str) -> Result<CounterReport, ProtocolError> {
    serde_json::from_str(body).map_err(|e| ProtocolError::Decode(e.to_string()))
}

/// Decodes the auth server's reply to a counters report.
///
/// Decoding is all-or-nothing: a body that fails anywhere yields an error
/// and no verdicts, so callers never act on half a batch.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] for non-JSON bodies, a missing or
/// non-array `resp` field, or verdict fields of the wrong type.
///
/// # Examples
///
/// ```rust
/// use portal_core::protocol::decode_response;
///
/// let resp = decode_response(r#"{"resp":[{"mac":"AA:BB","auth":0}]}"#).unwrap();
/// assert_eq!(resp.resp[0].denied_mac(), Some("AA:BB"));
/// ```
pub fn decode_response(body: &str) -> Result<AuthServerResponse, ProtocolError> {
    serde_json::from_str(body).map_err(|e| ProtocolError::Decode(e.to_string()))
}
