//! Integration tests for login, bearer auth, and error bodies.

use http::{Request, StatusCode};
use serde_json::json;

use pulse_core::types::UserId;

use crate::helpers::{ACCOUNT_EMAIL, ACCOUNT_PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "OPS@example.com", "password": ACCOUNT_PASSWORD })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["user_id"], app.account_id().to_string());

    let token = response.body["access_token"].as_str().unwrap();
    let claims = app.state.tokens.validate(token).unwrap();
    assert_eq!(claims.user_id(), app.account_id());
    assert_eq!(claims.email, ACCOUNT_EMAIL);
    assert_eq!(claims.exp - claims.iat, 900);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ACCOUNT_EMAIL, "password": "wrong" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_requires_authorization_header() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "UNAUTHORIZED");

    let request_id = response.headers["x-request-id"].to_str().unwrap();
    assert_eq!(response.body["error"]["request_id"], request_id);
}

#[tokio::test]
async fn test_scheme_prefix_is_exact() {
    let app = TestApp::new();
    let token = app.token_for(UserId::new());

    let builder = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("authorization", format!("bearer {token}"));
    let response = app.send(builder, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_token_has_distinct_code() {
    let app = TestApp::new();
    let token = app.expired_token_for(UserId::new());

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = TestApp::new();
    let mut token = app.token_for(UserId::new());
    token.push('x');

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_returns_injected_identity() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], user.to_string());
    assert_eq!(response.body["email"], "user@example.com");
    assert_eq!(response.body["plan"], "pro");
}

#[tokio::test]
async fn test_refresh_reissues_for_same_identity() {
    let app = TestApp::new();
    let user = UserId::new();
    let token = app.token_for(user);

    let response = app
        .request("POST", "/api/auth/refresh", Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let fresh = response.body["access_token"].as_str().unwrap();
    assert_eq!(app.state.tokens.validate(fresh).unwrap().user_id(), user);
}

#[tokio::test]
async fn test_supplied_request_id_is_echoed() {
    let app = TestApp::new();

    let builder = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header("x-request-id", "trace-abc-123");
    let response = app.send(builder, None).await;

    assert_eq!(response.headers["x-request-id"], "trace-abc-123");
    assert_eq!(response.body["error"]["request_id"], "trace-abc-123");
}
