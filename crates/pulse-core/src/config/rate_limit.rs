//! Request rate limiting configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Rate limits for each protected route group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Login and other unauthenticated auth endpoints.
    #[serde(default = "default_auth_group")]
    pub auth: RateLimitGroup,
    /// WebSocket handshake endpoint.
    #[serde(default = "default_handshake_group")]
    pub handshake: RateLimitGroup,
}

impl RateLimitConfig {
    /// Rejects groups that could never admit a request or never expire.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.validate("auth")?;
        self.handshake.validate("handshake")
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth: default_auth_group(),
            handshake: default_handshake_group(),
        }
    }
}

/// `(limit, window)` pair for one route group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitGroup {
    /// Maximum requests per window per source address.
    pub limit: u32,
    /// Window length in seconds.
    pub window_seconds: u64,
}

impl RateLimitGroup {
    /// Returns the window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    fn validate(&self, group: &str) -> Result<(), AppError> {
        if self.window_seconds == 0 {
            return Err(AppError::configuration(format!(
                "rate_limit.{group}.window_seconds must be at least 1"
            )));
        }
        if self.limit == 0 {
            return Err(AppError::configuration(format!(
                "rate_limit.{group}.limit must be at least 1"
            )));
        }
        Ok(())
    }
}

fn default_auth_group() -> RateLimitGroup {
    RateLimitGroup {
        limit: 10,
        window_seconds: 60,
    }
}

fn default_handshake_group() -> RateLimitGroup {
    RateLimitGroup {
        limit: 30,
        window_seconds: 60,
    }
}
