//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tokio::time::Instant;

use pulse_auth::{AccountDirectory, TokenAuthenticator};
use pulse_core::config::AppConfig;
use pulse_realtime::{RealtimeHub, WsAuthenticator};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuer and validator
    pub tokens: Arc<TokenAuthenticator>,
    /// Handshake authenticator sharing `tokens`
    pub ws_authenticator: WsAuthenticator,
    /// Login credential lookup
    pub accounts: Arc<dyn AccountDirectory>,
    /// Realtime update hub
    pub hub: Arc<RealtimeHub>,
    /// Limiter for the `auth` route group
    pub auth_limiter: RateLimiter,
    /// Limiter for the WebSocket handshake
    pub handshake_limiter: RateLimiter,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wires state from configuration and already-built collaborators.
    pub fn new(
        config: Arc<AppConfig>,
        accounts: Arc<dyn AccountDirectory>,
        hub: Arc<RealtimeHub>,
    ) -> Self {
        let tokens = Arc::new(TokenAuthenticator::new(&config.auth));
        let auth = config.rate_limit.auth;
        let handshake = config.rate_limit.handshake;

        Self {
            ws_authenticator: WsAuthenticator::new(Arc::clone(&tokens)),
            tokens,
            accounts,
            hub,
            auth_limiter: RateLimiter::new(auth.limit, auth.window()),
            handshake_limiter: RateLimiter::new(handshake.limit, handshake.window()),
            started_at: Instant::now(),
            config,
        }
    }
}
