//! Per-address request rate limiter and its middleware.
//!
//! Each source address gets a fixed window anchored at its first request
//! after any previous window expired. Within a window at most `limit`
//! requests are admitted. A background sweep evicts addresses idle for
//! longer than one window.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::http::header::RETRY_AFTER;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pulse_core::error::AppError;

use crate::error::{ApiError, request_id_from_headers};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed.
    Allow,
    /// The address exhausted its window.
    Deny,
}

#[derive(Debug, Clone, Copy)]
struct Visitor {
    count: u32,
    window_started: Instant,
}

/// Simple in-memory fixed-window rate limiter keyed by source IP.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// IP → visitor state.
    visitors: Arc<Mutex<HashMap<IpAddr, Visitor>>>,
    /// Maximum requests per window.
    limit: u32,
    /// Window length.
    window: Duration,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            visitors: Arc::new(Mutex::new(HashMap::new())),
            limit,
            window,
        }
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts a request from `ip` and decides whether to admit it.
    pub async fn admit(&self, ip: IpAddr) -> Admission {
        let now = Instant::now();
        let mut visitors = self.visitors.lock().await;

        let visitor = visitors.entry(ip).or_insert(Visitor {
            count: 0,
            window_started: now,
        });

        if now.duration_since(visitor.window_started) > self.window {
            visitor.count = 0;
            visitor.window_started = now;
        }

        visitor.count = visitor.count.saturating_add(1);
        if visitor.count <= self.limit {
            Admission::Allow
        } else {
            Admission::Deny
        }
    }

    /// Requests counted for `ip` in its current window.
    pub async fn request_count(&self, ip: IpAddr) -> u32 {
        self.visitors
            .lock()
            .await
            .get(&ip)
            .map(|v| v.count)
            .unwrap_or(0)
    }

    /// Number of tracked addresses.
    pub async fn visitor_count(&self) -> usize {
        self.visitors.lock().await.len()
    }

    /// Evicts addresses whose window started more than one window ago.
    /// Returns the number evicted.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut visitors = self.visitors.lock().await;
        let before = visitors.len();
        visitors.retain(|_, v| now.duration_since(v.window_started) <= self.window);
        before - visitors.len()
    }

    /// Runs [`sweep`](Self::sweep) once per window until `shutdown` fires.
    pub fn spawn_sweeper(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + limiter.window, limiter.window);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = limiter.sweep().await;
                        if evicted > 0 {
                            debug!(evicted, "Rate limiter sweep");
                        }
                    }
                }
            }
        })
    }
}

/// Middleware admitting requests through the limiter given as state.
///
/// Denied requests get `429 RATE_LIMITED` with a `retry-after` header.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let ip = addr.ip();
    if limiter.admit(ip).await == Admission::Allow {
        return next.run(request).await;
    }

    let request_id = request_id_from_headers(request.headers());
    warn!(
        ip = %ip,
        path = %request.uri().path(),
        request_id = request_id.as_deref().unwrap_or("-"),
        "Rate limit exceeded"
    );

    let mut response = ApiError::new(
        AppError::rate_limited("Too many requests, retry later"),
        request_id,
    )
    .into_response();
    response.headers_mut().insert(
        RETRY_AFTER,
        HeaderValue::from(limiter.window().as_secs()),
    );
    response
}
