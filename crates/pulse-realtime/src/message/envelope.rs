//! Tagged JSON envelope for server-pushed frames.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pulse_core::result::AppResult;

/// `{ "type": <string>, "payload": <any> }`, the only frame shape the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Event body
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Create an envelope from any serializable payload.
    pub fn new(kind: impl Into<String>, payload: impl Serialize) -> AppResult<Self> {
        Ok(Self {
            kind: kind.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Encode to the frame body sent on the wire.
    pub fn to_bytes(&self) -> AppResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
