//! Authentication configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder secret shipped with the default configuration.
pub const DEVELOPMENT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token signing and account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Accounts served by the static account directory.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_seconds: default_token_ttl(),
            accounts: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Whether the signing secret is still the shipped placeholder.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

/// A single login-capable account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Stable user identifier.
    pub id: Uuid,
    /// Login e-mail address.
    pub email: String,
    /// Subscription plan carried in token claims.
    #[serde(default = "default_plan")]
    pub plan: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

fn default_jwt_secret() -> String {
    DEVELOPMENT_JWT_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    900
}

fn default_plan() -> String {
    "free".to_string()
}
