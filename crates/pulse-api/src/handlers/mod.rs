//! HTTP and WebSocket handlers.

pub mod auth;
pub mod health;
pub mod realtime;
pub mod ws;
