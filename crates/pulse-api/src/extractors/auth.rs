//! `CurrentUser` extractor: the identity `require_auth` attached to the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pulse_core::error::AppError;

use crate::error::{ApiError, request_id_from_headers};
use crate::middleware::auth::AuthenticatedUser;

/// Authenticated user available in handlers behind `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl std::ops::Deref for CurrentUser {
    type Target = AuthenticatedUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                ApiError::new(
                    AppError::authentication("Authentication required"),
                    request_id_from_headers(&parts.headers),
                )
            })
    }
}
