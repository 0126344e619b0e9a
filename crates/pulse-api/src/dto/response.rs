//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::types::UserId;
use pulse_realtime::metrics::MetricsSnapshot;

use super::request::DeliveryPath;

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token.
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// Token subject.
    pub user_id: UserId,
}

/// Result of pushing a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishMessageResponse {
    /// Connections (direct) or broker subscribers (broker) reached.
    pub delivered: usize,
    /// Path taken.
    pub via: DeliveryPath,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Live connections.
    pub connections: usize,
    /// Users with at least one live connection.
    pub users: usize,
    /// Hub counters.
    pub realtime: MetricsSnapshot,
}
