//! Handle to one live connection, owned by the hub while registered.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pulse_core::types::{ConnectionId, UserId};

/// Failure to queue a frame on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The connection was closed or its writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// A handle to a single live connection.
///
/// Frames pushed through [`send`](Self::send) land on a bounded queue drained
/// by the connection's writer task, so frames to one connection keep the
/// order in which they were sent. [`close`](Self::close) signals the
/// transport to shut down.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Identity that owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<Bytes>,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Creates a handle and the receiving end its writer task drains.
    pub fn new(user_id: UserId, buffer: usize) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            user_id,
            connected_at: Utc::now(),
            sender,
            closed: CancellationToken::new(),
        };
        (Arc::new(handle), receiver)
    }

    /// Queues a frame, waiting for room if the client is slow to drain.
    ///
    /// Returns early with [`SendError::Closed`] if the connection is closed
    /// while waiting.
    pub async fn send(&self, payload: Bytes) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        tokio::select! {
            _ = self.closed.cancelled() => Err(SendError::Closed),
            result = self.sender.send(payload) => result.map_err(|_| SendError::Closed),
        }
    }

    /// Signals the transport to close. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Token cancelled when the connection is closed.
    pub fn close_signal(&self) -> CancellationToken {
        self.closed.clone()
    }
}
