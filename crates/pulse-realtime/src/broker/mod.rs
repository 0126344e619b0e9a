//! Publish/subscribe brokers carrying per-user update channels.
//!
//! Payloads are opaque bytes; whatever is published on a channel is
//! forwarded to clients unchanged.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tracing::info;

use pulse_core::config::{BrokerConfig, BrokerProvider};
use pulse_core::result::AppResult;

pub use self::memory::MemoryBroker;
pub use self::redis::RedisBroker;

/// Stream of raw payloads received on one channel. Dropping it unsubscribes.
pub type PayloadStream = BoxStream<'static, Bytes>;

/// A publish/subscribe message broker addressed by channel name.
#[async_trait]
pub trait Broker: Send + Sync + std::fmt::Debug {
    /// Subscribes to `channel`. The stream ends when the broker closes the channel.
    async fn subscribe(&self, channel: &str) -> AppResult<PayloadStream>;

    /// Publishes `payload` on `channel`, returning how many subscribers received it.
    async fn publish(&self, channel: &str, payload: Bytes) -> AppResult<usize>;
}

/// Builds the broker selected by configuration.
pub async fn connect(config: &BrokerConfig) -> AppResult<Arc<dyn Broker>> {
    match config.provider {
        BrokerProvider::Memory => {
            info!(
                buffer = config.channel_buffer_size,
                "Using in-memory broker"
            );
            Ok(Arc::new(MemoryBroker::new(config.channel_buffer_size)))
        }
        BrokerProvider::Redis => Ok(Arc::new(RedisBroker::connect(&config.redis_url).await?)),
    }
}
