//! Handshake authentication. The token arrives as a query parameter because
//! browser WebSocket clients cannot set headers.

use std::sync::Arc;

use pulse_auth::{AuthError, Claims, TokenAuthenticator};

/// Authenticates connection handshakes with the shared token authenticator.
#[derive(Clone)]
pub struct WsAuthenticator {
    tokens: Arc<TokenAuthenticator>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(tokens: Arc<TokenAuthenticator>) -> Self {
        Self { tokens }
    }

    /// Validates the handshake token. A missing or blank token is treated as
    /// malformed.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => self.tokens.validate(token),
            _ => Err(AuthError::MissingHeader),
        }
    }
}
