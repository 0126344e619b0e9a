//! In-memory pub/sub for single-node deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use pulse_core::result::AppResult;

use super::{Broker, PayloadStream};

/// In-memory pub/sub implementation on tokio broadcast channels.
#[derive(Debug)]
pub struct MemoryBroker {
    /// Channel name → broadcast sender
    channels: RwLock<HashMap<String, broadcast::Sender<Bytes>>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryBroker {
    /// Create a new in-memory broker
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Number of live subscribers on `channel`.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Drops the channel; every open subscription stream on it ends.
    pub async fn close_channel(&self, channel: &str) -> bool {
        self.channels.write().await.remove(channel).is_some()
    }

    async fn prune_if_idle(&self, channel: &str) {
        let mut channels = self.channels.write().await;
        if channels
            .get(channel)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(channel);
        }
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn subscribe(&self, channel: &str) -> AppResult<PayloadStream> {
        let rx = {
            let mut channels = self.channels.write().await;
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(self.buffer_size).0)
                .subscribe()
        };

        let name = channel.to_string();
        let payloads = stream::unfold(rx, move |mut rx| {
            let name = name.clone();
            async move {
                loop {
                    match rx.recv().await {
                        Ok(payload) => return Some((payload, rx)),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(channel = %name, skipped, "Subscriber lagged, payloads dropped");
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        });

        Ok(payloads.boxed())
    }

    async fn publish(&self, channel: &str, payload: Bytes) -> AppResult<usize> {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(channel) {
                Some(tx) => tx.send(payload).unwrap_or(0),
                None => return Ok(0),
            }
        };

        if delivered == 0 {
            self.prune_if_idle(channel).await;
        }

        Ok(delivered)
    }
}
