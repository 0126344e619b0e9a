//! # pulse-realtime
//!
//! Real-time update hub for Pulse. Provides:
//!
//! - A per-user registry of live connections
//! - One broker subscription per connected user, forwarding every payload
//!   published on `user_updates:<user id>` to all of that user's connections
//! - A direct, broker-bypassing delivery path for in-process producers
//! - Handshake authentication on top of `pulse-auth`
//! - In-memory and Redis broker implementations

pub mod broker;
pub mod connection;
pub mod hub;
pub mod message;
pub mod metrics;

pub use broker::{Broker, MemoryBroker};
pub use connection::{ConnectionHandle, SendError, WsAuthenticator};
pub use hub::{RealtimeHub, user_channel};
pub use message::Envelope;
pub use metrics::RealtimeMetrics;
