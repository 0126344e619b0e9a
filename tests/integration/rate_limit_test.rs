//! Integration tests for per-address throttling of the login route.

use http::StatusCode;
use serde_json::json;

use pulse_core::types::UserId;

use crate::helpers::TestApp;

fn bad_login() -> serde_json::Value {
    json!({ "email": "nobody@example.com", "password": "x" })
}

#[tokio::test]
async fn test_eleventh_login_attempt_is_throttled() {
    let app = TestApp::new();

    for attempt in 1..=10 {
        let response = app
            .request("POST", "/api/auth/login", None, Some(bad_login()))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "attempt {attempt}");
    }

    let response = app
        .request("POST", "/api/auth/login", None, Some(bad_login()))
        .await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"]["code"], "RATE_LIMITED");
    assert_eq!(response.headers["retry-after"], "60");
    assert!(response.body["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_throttling_is_scoped_to_its_route_group() {
    let app = TestApp::new();
    for _ in 0..11 {
        app.request("POST", "/api/auth/login", None, Some(bad_login()))
            .await;
    }

    let token = app.token_for(UserId::new());
    let me = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);

    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
}
