//! Realtime hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Connections registered since start
    pub connections_total: AtomicU64,
    /// Subscription tasks currently running
    pub subscriptions_active: AtomicU64,
    /// Frames queued on connections
    pub messages_delivered: AtomicU64,
    /// Frames that could not be queued
    pub delivery_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_active.fetch_add(1, Ordering::Relaxed);
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self, delivered: usize, failed: usize) {
        self.messages_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.delivery_failures
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Marks a subscription task as running until the guard is dropped.
    pub(crate) fn subscription_guard(&self) -> SubscriptionGuard<'_> {
        self.subscriptions_active.fetch_add(1, Ordering::SeqCst);
        SubscriptionGuard { metrics: self }
    }

    /// Number of subscription tasks currently running.
    pub fn active_subscriptions(&self) -> u64 {
        self.subscriptions_active.load(Ordering::SeqCst)
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            subscriptions_active: self.subscriptions_active.load(Ordering::SeqCst),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Decrements the running subscription count on drop.
#[derive(Debug)]
pub(crate) struct SubscriptionGuard<'a> {
    metrics: &'a RealtimeMetrics,
}

impl Drop for SubscriptionGuard<'_> {
    fn drop(&mut self) {
        self.metrics
            .subscriptions_active
            .fetch_sub(1, Ordering::SeqCst);
    }
}

/// Serializable snapshot of metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections currently registered
    pub connections_active: u64,
    /// Connections registered since start
    pub connections_total: u64,
    /// Subscription tasks currently running
    pub subscriptions_active: u64,
    /// Frames queued on connections
    pub messages_delivered: u64,
    /// Frames that could not be queued
    pub delivery_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_guard() {
        let metrics = RealtimeMetrics::new();
        {
            let _guard = metrics.subscription_guard();
            assert_eq!(metrics.active_subscriptions(), 1);
        }
        assert_eq!(metrics.active_subscriptions(), 0);
    }

    #[test]
    fn test_snapshot() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.record_delivery(3, 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_active, 1);
        assert_eq!(snap.connections_total, 2);
        assert_eq!(snap.messages_delivered, 3);
        assert_eq!(snap.delivery_failures, 1);
    }
}
