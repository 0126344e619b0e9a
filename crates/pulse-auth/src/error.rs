//! Authentication failure taxonomy.

use thiserror::Error;

use pulse_core::error::AppError;

/// Why a token or `Authorization` header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request.
    #[error("Missing Authorization header")]
    MissingHeader,
    /// Header present but not `Bearer <token>`.
    #[error("Invalid Authorization header format")]
    MalformedHeader,
    /// Signature did not verify, or the token was not HS256.
    #[error("Invalid token signature")]
    InvalidSignature,
    /// Current time is at or past `exp`.
    #[error("Token has expired")]
    Expired,
    /// Required claims missing or of the wrong shape.
    #[error("Malformed token claims")]
    MalformedClaims,
}

impl AuthError {
    /// Machine-readable error code for HTTP responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Expired => "TOKEN_EXPIRED",
            _ => "UNAUTHORIZED",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => AppError::token_expired(err.to_string()),
            _ => AppError::authentication(err.to_string()),
        }
    }
}
