//! Route definitions for the Pulse HTTP API.
//!
//! JSON routes are mounted under `/api`; the WebSocket handshake lives at
//! `/ws`. Each route group carries its own guard as a route layer.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};

use crate::handlers;
use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::rate_limit;
use crate::state::AppState;

/// Build the Axum router with all routes and their per-group guards.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(login_routes(&state))
        .merge(protected_routes(&state));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes(&state))
        .with_state(state)
}

/// Unauthenticated status endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Credential exchange, throttled per source address
fn login_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth_limiter.clone(),
            rate_limit,
        ))
}

/// Endpoints requiring a valid bearer token
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/realtime/messages",
            post(handlers::realtime::publish_message),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}

/// WebSocket handshake, throttled per source address
fn ws_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route_layer(axum_middleware::from_fn_with_state(
            state.handshake_limiter.clone(),
            rate_limit,
        ))
}
