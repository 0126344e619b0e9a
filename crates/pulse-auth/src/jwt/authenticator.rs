//! Issue/validate facade shared by the HTTP middleware and the WebSocket handshake.

use chrono::Utc;

use pulse_core::config::AuthConfig;
use pulse_core::error::AppError;
use pulse_core::types::UserId;

use crate::error::AuthError;

use super::claims::Claims;
use super::decoder::JwtDecoder;
use super::encoder::{IssuedToken, JwtEncoder};

/// Issues and validates identity tokens. Holds no per-token state.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenAuthenticator {
    /// Creates an authenticator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }

    /// Issues a token valid from now for the configured lifetime.
    pub fn issue(&self, user_id: UserId, email: &str, plan: &str) -> Result<IssuedToken, AppError> {
        self.issue_at(user_id, email, plan, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (unix seconds).
    pub fn issue_at(
        &self,
        user_id: UserId,
        email: &str,
        plan: &str,
        now: i64,
    ) -> Result<IssuedToken, AppError> {
        self.encoder.encode_at(user_id, email, plan, now)
    }

    /// Re-issues a token for the holder of already-validated claims.
    pub fn refresh(&self, claims: &Claims) -> Result<IssuedToken, AppError> {
        self.issue(claims.sub, &claims.email, &claims.plan)
    }

    /// Validates a token against the wall clock.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validates a token as if the current time were `now` (unix seconds).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.decoder.decode_at(token, now)
    }
}
