//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::connect_info::MockConnectInfo;
use chrono::Utc;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use pulse_api::{AppState, build_app};
use pulse_auth::{PasswordHasher, StaticAccountDirectory};
use pulse_core::config::{AccountConfig, AppConfig};
use pulse_core::types::UserId;
use pulse_realtime::{MemoryBroker, RealtimeHub, user_channel};

/// Signing secret shared by every test app.
pub const TEST_SECRET: &str = "integration-test-secret";
/// Email of the configured test account.
pub const ACCOUNT_EMAIL: &str = "ops@example.com";
/// Password of the configured test account.
pub const ACCOUNT_PASSWORD: &str = "correct horse battery staple";
/// Source address every in-process request appears to come from.
pub const CLIENT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 40_000);

fn account_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        PasswordHasher::new()
            .hash_password(ACCOUNT_PASSWORD)
            .expect("hash test password")
    })
}

/// Configuration with a fixed secret and one account.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.auth.accounts = vec![AccountConfig {
        id: UserId::new().into_uuid(),
        email: ACCOUNT_EMAIL.to_string(),
        plan: "team".to_string(),
        password_hash: account_hash().to_string(),
    }];
    config
}

/// Test application context
pub struct TestApp {
    /// Router with a mocked peer address, for `oneshot` requests
    pub router: Router,
    /// Shared state (hub, limiters, token authenticator)
    pub state: AppState,
    /// The in-memory broker behind the hub
    pub broker: Arc<MemoryBroker>,
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as JSON (`Null` when empty or not JSON)
    pub body: Value,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from explicit configuration
    pub fn with_config(config: AppConfig) -> Self {
        let broker = Arc::new(MemoryBroker::new(64));
        let hub = Arc::new(RealtimeHub::new(broker.clone(), &config.realtime));
        let accounts = Arc::new(StaticAccountDirectory::new(&config.auth.accounts));
        let state = AppState::new(Arc::new(config), accounts, hub);

        let router = build_app(state.clone()).layer(MockConnectInfo(SocketAddr::from(CLIENT_ADDR)));

        Self {
            router,
            state,
            broker,
        }
    }

    /// The configured test account's identity
    pub fn account_id(&self) -> UserId {
        UserId::from_uuid(self.state.config.auth.accounts[0].id)
    }

    /// A valid token for `user_id`
    pub fn token_for(&self, user_id: UserId) -> String {
        self.state
            .tokens
            .issue(user_id, "user@example.com", "pro")
            .expect("issue token")
            .token
    }

    /// A token for `user_id` that expired one second ago
    pub fn expired_token_for(&self, user_id: UserId) -> String {
        self.state
            .tokens
            .issue_at(user_id, "user@example.com", "pro", Utc::now().timestamp() - 901)
            .expect("issue token")
            .token
    }

    /// Make a request through the router
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder, body).await
    }

    /// Send a prepared request through the router
    pub async fn send(&self, builder: http::request::Builder, body: Option<Value>) -> TestResponse {
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Serve the app on an ephemeral port, returning its address
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_app(self.state.clone());

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("test server");
        });

        addr
    }

    /// Wait until `user_id` has exactly `expected` registered connections
    pub async fn wait_for_connections(&self, user_id: UserId, expected: usize) {
        for _ in 0..300 {
            if self.state.hub.user_connection_count(&user_id).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{user_id} never reached {expected} connections");
    }

    /// Wait until the broker channel of `user_id` has exactly `expected` subscribers
    pub async fn wait_for_subscribers(&self, user_id: UserId, expected: usize) {
        let channel = user_channel(&user_id);
        for _ in 0..300 {
            if self.broker.subscriber_count(&channel).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{channel} never reached {expected} subscribers");
    }
}
