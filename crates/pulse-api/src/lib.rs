//! # pulse-api
//!
//! HTTP API layer for Pulse built on Axum.
//!
//! Provides the auth and realtime endpoints, the WebSocket handshake,
//! middleware (bearer auth, per-address rate limiting, CORS, request
//! logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use middleware::rate_limit::{Admission, RateLimiter};
pub use state::AppState;
