//! Auth handlers: login, refresh, me.

use axum::Json;
use axum::extract::State;
use tracing::{info, warn};

use pulse_auth::jwt::encoder::IssuedToken;
use pulse_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::TokenResponse;
use crate::error::{ApiError, RequestId};
use crate::extractors::CurrentUser;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;

fn token_response(issued: IssuedToken) -> TokenResponse {
    TokenResponse {
        expires_at: issued.expires_at(),
        user_id: issued.claims.sub,
        access_token: issued.token,
        token_type: "Bearer".to_string(),
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let account = state
        .accounts
        .verify_credentials(&req.email, &req.password)
        .await
        .map_err(|e| request_id.reject(e))?;

    let Some(account) = account else {
        warn!(email = %req.email, "Login failed");
        return Err(request_id.reject(AppError::authentication("Invalid email or password")));
    };

    let issued = state
        .tokens
        .issue(account.id, &account.email, &account.plan)
        .map_err(|e| request_id.reject(e))?;

    info!(user_id = %account.id, "User logged in");
    Ok(Json(token_response(issued)))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    request_id: RequestId,
    user: CurrentUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state
        .tokens
        .issue(user.user_id, &user.email, &user.plan)
        .map_err(|e| request_id.reject(e))?;

    Ok(Json(token_response(issued)))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<AuthenticatedUser> {
    Json(user)
}
