//! Integration tests for the WebSocket handshake and delivery over a real socket.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use pulse_core::types::UserId;
use pulse_realtime::{Broker, Envelope, user_channel};

use crate::helpers::TestApp;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open(addr: SocketAddr, token: &str) -> Client {
    let (client, _response) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("handshake should succeed");
    client
}

async fn assert_rejected(addr: SocketAddr, query: &str) {
    match connect_async(format!("ws://{addr}/ws{query}")).await {
        Err(WsError::Http(response)) => {
            assert_eq!(response.status(), 401);
            assert!(response.body().as_ref().is_none_or(|body| body.is_empty()));
        }
        Err(other) => panic!("unexpected handshake error: {other}"),
        Ok(_) => panic!("handshake should have been rejected"),
    }
}

async fn next_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("frame within timeout")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = message {
            return text.as_str().to_string();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(next.is_err(), "expected no frame, got {next:?}");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    assert_rejected(addr, "").await;
    assert_rejected(addr, "?token=").await;
    assert_rejected(addr, "?token=garbage").await;
}

#[tokio::test]
async fn test_unparseable_query_rejected_without_detail() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let token = app.token_for(UserId::new());

    assert_rejected(addr, &format!("?token={token}&token={token}")).await;
    assert_rejected(addr, "?token=%ZZ").await;
}

#[tokio::test]
async fn test_expired_token_rejected_despite_prior_sessions() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let user = UserId::new();

    let _live = open(addr, &app.token_for(user)).await;
    app.wait_for_connections(user, 1).await;

    assert_rejected(addr, &format!("?token={}", app.expired_token_for(user))).await;
    assert_eq!(app.state.hub.user_connection_count(&user).await, 1);
}

#[tokio::test]
async fn test_send_to_user_reaches_every_connection_of_that_user() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let alice = UserId::new();
    let bob = UserId::new();

    let mut a1 = open(addr, &app.token_for(alice)).await;
    let mut a2 = open(addr, &app.token_for(alice)).await;
    let mut b1 = open(addr, &app.token_for(bob)).await;
    app.wait_for_connections(alice, 2).await;
    app.wait_for_connections(bob, 1).await;

    let message = Envelope::new("job_progress", json!({ "percent": 75 })).unwrap();
    let delivered = app.state.hub.send_to_user(&alice, &message).await.unwrap();
    assert_eq!(delivered, 2);

    let expected = String::from_utf8(message.to_bytes().unwrap().to_vec()).unwrap();
    assert_eq!(next_text(&mut a1).await, expected);
    assert_eq!(next_text(&mut a2).await, expected);
    assert_silent(&mut b1).await;
}

#[tokio::test]
async fn test_broker_payload_forwarded_verbatim() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let user = UserId::new();

    let mut client = open(addr, &app.token_for(user)).await;
    app.wait_for_subscribers(user, 1).await;

    let raw = r#"{"type":"job_failed","payload":{"error":"disk full"}}"#;
    let receivers = app
        .broker
        .publish(&user_channel(&user), Bytes::from_static(raw.as_bytes()))
        .await
        .unwrap();
    assert_eq!(receivers, 1);

    assert_eq!(next_text(&mut client).await, raw);
}

#[tokio::test]
async fn test_disconnect_cancels_subscription() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let user = UserId::new();

    let mut client = open(addr, &app.token_for(user)).await;
    app.wait_for_subscribers(user, 1).await;

    client.close(None).await.unwrap();
    app.wait_for_connections(user, 0).await;
    app.wait_for_subscribers(user, 0).await;

    assert!(!app.state.hub.has_subscription(&user).await);
    let envelope = Envelope::new("job_progress", json!({})).unwrap();
    assert_eq!(app.state.hub.publish(&user, &envelope).await.unwrap(), 0);
}

#[tokio::test]
async fn test_abrupt_drop_cancels_subscription() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let user = UserId::new();

    let client = open(addr, &app.token_for(user)).await;
    app.wait_for_subscribers(user, 1).await;

    // No close frame: the server sees the transport end.
    drop(client);
    app.wait_for_connections(user, 0).await;
    app.wait_for_subscribers(user, 0).await;

    assert!(!app.state.hub.has_subscription(&user).await);
    assert_eq!(app.state.hub.user_count().await, 0);
}

#[tokio::test]
async fn test_close_all_sends_close_frame() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let user = UserId::new();

    let mut client = open(addr, &app.token_for(user)).await;
    app.wait_for_connections(user, 1).await;

    assert_eq!(app.state.hub.close_all().await, 1);

    let next = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("frame within timeout");
    assert!(matches!(next, Some(Ok(Message::Close(_))) | None));
}
