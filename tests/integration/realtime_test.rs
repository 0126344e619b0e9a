//! Integration tests for the message push endpoint and health report.

use http::StatusCode;
use serde_json::json;

use pulse_core::types::UserId;
use pulse_realtime::Envelope;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_direct_message_reaches_callers_connections() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);
    let (_first, mut first) = app.state.hub.connect(user).await;
    let (_second, mut second) = app.state.hub.connect(user).await;

    let response = app
        .request(
            "POST",
            "/api/realtime/messages",
            Some(&token),
            Some(json!({ "type": "job_progress", "payload": { "percent": 10 } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["delivered"], 2);
    assert_eq!(response.body["via"], "direct");

    let expected = Envelope::new("job_progress", json!({ "percent": 10 }))
        .unwrap()
        .to_bytes()
        .unwrap();
    assert_eq!(first.recv().await.unwrap(), expected);
    assert_eq!(second.recv().await.unwrap(), expected);
}

#[tokio::test]
async fn test_broker_message_goes_through_subscription() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);
    let (_handle, mut frames) = app.state.hub.connect(user).await;
    app.wait_for_subscribers(user, 1).await;

    let response = app
        .request(
            "POST",
            "/api/realtime/messages",
            Some(&token),
            Some(json!({ "type": "job_completed", "payload": {}, "via": "broker" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["delivered"], 1);

    let frame: serde_json::Value = serde_json::from_slice(&frames.recv().await.unwrap()).unwrap();
    assert_eq!(frame, json!({ "type": "job_completed", "payload": {} }));
}

#[tokio::test]
async fn test_empty_type_rejected() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "POST",
            "/api/realtime/messages",
            Some(&token),
            Some(json!({ "type": " ", "payload": null })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_push_requires_auth() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/realtime/messages",
            None,
            Some(json!({ "type": "job_progress" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_hub_counts() {
    let app = TestApp::new();
    let (_a, _rx_a) = app.state.hub.connect(UserId::new()).await;
    let (_b, _rx_b) = app.state.hub.connect(UserId::new()).await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["connections"], 2);
    assert_eq!(response.body["users"], 2);
    assert_eq!(response.body["realtime"]["connections_total"], 2);
}
