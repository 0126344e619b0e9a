//! Per-user connection registry bridged to the broker.
//!
//! Every user with at least one live connection owns exactly one
//! subscription task reading `user_updates:<user id>` from the broker. The
//! task and the connection list live in the same registry record, so the
//! task is started when the first connection registers and cancelled when
//! the last one leaves.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pulse_core::config::RealtimeConfig;
use pulse_core::result::AppResult;
use pulse_core::types::UserId;

use crate::broker::Broker;
use crate::connection::ConnectionHandle;
use crate::message::Envelope;
use crate::metrics::RealtimeMetrics;

/// Broker channel carrying updates for one user.
pub fn user_channel(user_id: &UserId) -> String {
    format!("user_updates:{user_id}")
}

/// Live connections of one user plus the cancellation handle of its
/// subscription task. Never stored with an empty connection list.
#[derive(Debug)]
struct UserConnections {
    connections: Vec<Arc<ConnectionHandle>>,
    subscription: CancellationToken,
    task: JoinHandle<()>,
}

impl UserConnections {
    /// The task may also stop on its own when subscribing fails or the
    /// broker closes the channel.
    fn subscription_running(&self) -> bool {
        !self.subscription.is_cancelled() && !self.task.is_finished()
    }
}

/// The realtime update hub.
#[derive(Debug)]
pub struct RealtimeHub {
    users: RwLock<HashMap<UserId, UserConnections>>,
    broker: Arc<dyn Broker>,
    metrics: Arc<RealtimeMetrics>,
    connection_buffer: usize,
}

impl RealtimeHub {
    /// Creates an empty hub on top of `broker`.
    pub fn new(broker: Arc<dyn Broker>, config: &RealtimeConfig) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            broker,
            metrics: Arc::new(RealtimeMetrics::new()),
            connection_buffer: config.connection_buffer_size,
        }
    }

    /// Creates a connection handle for `user_id` and registers it.
    ///
    /// The returned receiver yields every frame queued for the connection and
    /// must be drained by the transport's writer.
    pub async fn connect(
        self: &Arc<Self>,
        user_id: UserId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<Bytes>) {
        let (handle, frames) = ConnectionHandle::new(user_id, self.connection_buffer);
        self.register(Arc::clone(&handle)).await;
        (handle, frames)
    }

    /// Adds a connection to its user's set, starting the user's subscription
    /// task if this is the first connection.
    pub async fn register(self: &Arc<Self>, handle: Arc<ConnectionHandle>) {
        let user_id = handle.user_id;
        let connection_id = handle.id;

        let mut users = self.users.write().await;
        let total = match users.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.connections.push(handle);
                record.connections.len()
            }
            Entry::Vacant(entry) => {
                let subscription = CancellationToken::new();
                let task = self.spawn_subscription(user_id, subscription.clone());
                entry.insert(UserConnections {
                    connections: vec![handle],
                    subscription,
                    task,
                });
                1
            }
        };
        drop(users);

        self.metrics.connection_opened();
        info!(
            user_id = %user_id,
            connection_id = %connection_id,
            total,
            "Connection registered"
        );
    }

    /// Closes a connection and removes it from its user's set. When the set
    /// becomes empty the user's subscription task is cancelled.
    ///
    /// Returns `false` if the connection was not registered.
    pub async fn unregister(&self, handle: &ConnectionHandle) -> bool {
        // Close first so a broadcast stuck on this connection releases the read lock.
        handle.close();

        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&handle.user_id) else {
            return false;
        };

        let before = record.connections.len();
        record.connections.retain(|c| c.id != handle.id);
        if record.connections.len() == before {
            return false;
        }
        let remaining = record.connections.len();

        if remaining == 0 {
            if let Some(record) = users.remove(&handle.user_id) {
                record.subscription.cancel();
            }
        }
        drop(users);

        self.metrics.connection_closed();
        info!(
            user_id = %handle.user_id,
            connection_id = %handle.id,
            remaining,
            "Connection unregistered"
        );
        true
    }

    /// Queues `payload` on every connection of `user_id`.
    ///
    /// Best effort: a failed connection is logged and skipped, and is left for
    /// its own read loop to unregister. Returns how many connections accepted
    /// the frame.
    pub async fn broadcast(&self, user_id: &UserId, payload: Bytes) -> usize {
        let users = self.users.read().await;
        let Some(record) = users.get(user_id) else {
            return 0;
        };

        let mut delivered = 0;
        let mut failed = 0;
        for connection in &record.connections {
            match connection.send(payload.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        user_id = %user_id,
                        connection_id = %connection.id,
                        error = %e,
                        "Failed to deliver frame"
                    );
                }
            }
        }

        self.metrics.record_delivery(delivered, failed);
        delivered
    }

    /// Delivers an envelope straight to the user's connections without going
    /// through the broker.
    pub async fn send_to_user(&self, user_id: &UserId, envelope: &Envelope) -> AppResult<usize> {
        let payload = envelope.to_bytes()?;
        Ok(self.broadcast(user_id, payload).await)
    }

    /// Publishes an envelope on the user's broker channel. Returns the number
    /// of broker subscribers that received it.
    pub async fn publish(&self, user_id: &UserId, envelope: &Envelope) -> AppResult<usize> {
        let payload = envelope.to_bytes()?;
        self.broker.publish(&user_channel(user_id), payload).await
    }

    /// Closes every connection and cancels every subscription task.
    pub async fn close_all(&self) -> usize {
        let mut users = self.users.write().await;
        let mut closed = 0;
        for (_, record) in users.drain() {
            record.subscription.cancel();
            for connection in record.connections {
                connection.close();
                self.metrics.connection_closed();
                closed += 1;
            }
        }
        info!(closed, "Closed all realtime connections");
        closed
    }

    /// Total registered connections.
    pub async fn connection_count(&self) -> usize {
        self.users
            .read()
            .await
            .values()
            .map(|record| record.connections.len())
            .sum()
    }

    /// Users with at least one registered connection.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Registered connections for one user.
    pub async fn user_connection_count(&self, user_id: &UserId) -> usize {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|record| record.connections.len())
            .unwrap_or(0)
    }

    /// Whether a live subscription task is bound to the user.
    pub async fn has_subscription(&self, user_id: &UserId) -> bool {
        self.users
            .read()
            .await
            .get(user_id)
            .is_some_and(UserConnections::subscription_running)
    }

    /// Hub metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    fn spawn_subscription(
        self: &Arc<Self>,
        user_id: UserId,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let metrics = Arc::clone(&hub.metrics);
            let _running = metrics.subscription_guard();
            let channel = user_channel(&user_id);

            let mut payloads = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = hub.broker.subscribe(&channel) => match result {
                    Ok(payloads) => payloads,
                    Err(e) => {
                        error!(channel = %channel, error = %e, "Broker subscription failed");
                        return;
                    }
                },
            };
            debug!(channel = %channel, "Subscription task started");

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    next = payloads.next() => match next {
                        Some(payload) => {
                            hub.broadcast(&user_id, payload).await;
                        }
                        None => {
                            warn!(channel = %channel, "Broker channel closed");
                            break;
                        }
                    },
                }
            }

            debug!(channel = %channel, "Subscription task stopped");
        })
    }
}
