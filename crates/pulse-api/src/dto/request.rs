//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email (case-insensitive).
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Which path a test message takes to the caller's connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPath {
    /// Straight to the hub, bypassing the broker.
    #[default]
    Direct,
    /// Published on the caller's broker channel.
    Broker,
}

/// Push a message to the caller's own connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishMessageRequest {
    /// Envelope type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Envelope payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Delivery path.
    #[serde(default)]
    pub via: DeliveryPath,
}

/// Query string of the WebSocket handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandshakeQuery {
    /// Access token.
    pub token: Option<String>,
}
