//! Token creation with a configurable TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use pulse_core::config::AuthConfig;
use pulse_core::error::AppError;
use pulse_core::types::UserId;

use super::claims::Claims;

/// Signing algorithm for every token Pulse issues.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime in seconds.
    ttl_seconds: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// A freshly signed token and its claims.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// The signed claims.
    pub claims: Claims,
}

impl IssuedToken {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_seconds: i64::try_from(config.token_ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Signs a token issued at `now` (unix seconds).
    pub fn encode_at(
        &self,
        user_id: UserId,
        email: &str,
        plan: &str,
        now: i64,
    ) -> Result<IssuedToken, AppError> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            plan: plan.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }
}
