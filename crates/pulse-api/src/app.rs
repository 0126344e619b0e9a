//! Application builder and server runner.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use pulse_auth::StaticAccountDirectory;
use pulse_core::config::AppConfig;
use pulse_core::error::AppError;
use pulse_realtime::{RealtimeHub, broker};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
///
/// Every request gets an `x-request-id` (generated unless supplied) before
/// anything else runs, and the id is echoed on the response.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Wires state from configuration and serves until a shutdown signal.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Pulse server...");

    if config.auth.uses_development_secret() {
        warn!("auth.jwt_secret is the development placeholder; set PULSE__AUTH__JWT_SECRET");
    }

    let broker = broker::connect(&config.realtime.broker).await?;
    let hub = Arc::new(RealtimeHub::new(broker, &config.realtime));

    let accounts = Arc::new(StaticAccountDirectory::new(&config.auth.accounts));
    if accounts.is_empty() {
        warn!("No accounts configured; login will reject every request");
    }

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), accounts, Arc::clone(&hub));

    let shutdown = CancellationToken::new();
    let sweepers = [
        state.auth_limiter.spawn_sweeper(shutdown.child_token()),
        state.handshake_limiter.spawn_sweeper(shutdown.child_token()),
    ];

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Pulse server listening on {}", addr);

    let app = build_app(state);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let shutdown = shutdown.clone();
        let hub = Arc::clone(&hub);
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            hub.close_all().await;
            shutdown.cancel();
        }
    })
    .into_future();

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    shutdown.cancel();
    for sweeper in sweepers {
        if let Err(e) = sweeper.await {
            error!(error = %e, "Rate limiter sweeper failed");
        }
    }

    info!("Pulse server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
