//! Bearer token authentication middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use pulse_auth::{AuthError, parse_bearer};
use pulse_core::types::UserId;

use crate::error::{ApiError, request_id_from_headers};
use crate::state::AppState;

/// Identity attached to a request once its bearer token validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// Token subject
    pub user_id: UserId,
    /// Account email
    pub email: String,
    /// Subscription plan
    pub plan: String,
    /// When the presented token expires
    pub expires_at: DateTime<Utc>,
}

/// Rejects the request unless it carries `Authorization: Bearer <valid token>`.
///
/// On success the validated identity is inserted into the request extensions
/// as an [`AuthenticatedUser`] for the `CurrentUser` extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = request_id_from_headers(request.headers());

    let user = match authenticate(&state, &request) {
        Ok(user) => user,
        Err(err) => {
            warn!(
                path = %request.uri().path(),
                request_id = request_id.as_deref().unwrap_or("-"),
                reason = %err,
                "Rejected unauthenticated request"
            );
            return Err(ApiError::new(err, request_id));
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn authenticate(state: &AppState, request: &Request) -> Result<AuthenticatedUser, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::MalformedHeader))
        .transpose()?;

    let token = parse_bearer(header)?;
    let claims = state.tokens.validate(token)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id(),
        expires_at: claims.expires_at(),
        email: claims.email,
        plan: claims.plan,
    })
}
