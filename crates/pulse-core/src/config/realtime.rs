//! Real-time WebSocket hub configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound frame queue depth per connection.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Publish/subscribe broker settings.
    #[serde(default)]
    pub broker: BrokerConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer_size: default_connection_buffer(),
            broker: BrokerConfig::default(),
        }
    }
}

/// Which broker implementation backs the per-user channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerProvider {
    /// In-process broadcast channels (single node).
    Memory,
    /// Redis pub/sub.
    Redis,
}

/// Broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker implementation.
    #[serde(default = "default_provider")]
    pub provider: BrokerProvider,
    /// Redis connection URL (used when `provider = "redis"`).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Per-channel buffer for the in-memory broker.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: default_redis_url(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_connection_buffer() -> usize {
    64
}

fn default_provider() -> BrokerProvider {
    BrokerProvider::Memory
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_channel_buffer() -> usize {
    256
}
