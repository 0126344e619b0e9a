//! WebSocket handshake and per-connection loops.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use pulse_core::types::UserId;
use pulse_realtime::RealtimeHub;

use crate::dto::request::HandshakeQuery;
use crate::state::AppState;

/// How long the writer may take to flush the close frame after the read loop ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /ws?token={jwt}
///
/// The token is validated before the upgrade. Any failure yields a bare
/// `401` so clients cannot tell which check failed.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    query: Result<Query<HandshakeQuery>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let token = match query {
        Ok(Query(query)) => query.token,
        Err(rejection) => {
            warn!(
                ip = %addr.ip(),
                reason = %rejection.body_text(),
                "WebSocket handshake rejected"
            );
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let claims = match state.ws_authenticator.authenticate(token.as_deref()) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(ip = %addr.ip(), reason = %err, "WebSocket handshake rejected");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let hub = Arc::clone(&state.hub);
    let user_id = claims.user_id();
    ws.on_upgrade(move |socket| serve_connection(hub, user_id, socket))
}

/// Drives one upgraded connection until the client leaves or the hub closes it.
async fn serve_connection(hub: Arc<RealtimeHub>, user_id: UserId, socket: WebSocket) {
    let (mut sink, mut inbound) = socket.split();
    let (handle, mut frames) = hub.connect(user_id).await;
    let close = handle.close_signal();
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    let writer = {
        let close = close.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = close.cancelled() => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    frame = frames.recv() => match frame {
                        Some(payload) => {
                            if sink.send(to_message(payload)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        })
    };

    // Inbound frames carry no meaning; the loop only watches for disconnects.
    loop {
        tokio::select! {
            _ = close.cancelled() => break,
            next = inbound.next() => match next {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read failed");
                    break;
                }
            },
        }
    }

    hub.unregister(&handle).await;
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        debug!(conn_id = %conn_id, "WebSocket writer did not finish in time");
    }

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}

/// Text frame when the payload is UTF-8, binary otherwise.
fn to_message(payload: Bytes) -> Message {
    match std::str::from_utf8(&payload) {
        Ok(text) => Message::Text(text.into()),
        Err(_) => Message::Binary(payload),
    }
}
