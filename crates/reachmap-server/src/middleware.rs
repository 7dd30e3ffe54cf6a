use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

#[derive(Debug)]
struct RateLimitWindows {
    by_client: HashMap<Option<IpAddr>, RateLimitWindow>,
    last_swept: Instant,
}

/// Fixed-window limiter with one window per client IP.
///
/// Requests without a peer address (no `ConnectInfo`) share a single window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindows>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindows {
                by_client: HashMap::new(),
                last_swept: Instant::now(),
            })),
        }
    }

    /// Records one request from `client`; false once its window is spent.
    async fn admit(&self, client: Option<IpAddr>) -> bool {
        let mut windows = self.state.lock().await;
        let now = Instant::now();

        // Drop idle clients once per window so the map stays bounded.
        if now.duration_since(windows.last_swept) >= self.window {
            let window = self.window;
            windows
                .by_client
                .retain(|_, w| now.duration_since(w.started_at) < window);
            windows.last_swept = now;
        }

        let entry = windows.by_client.entry(client).or_insert(RateLimitWindow {
            started_at: now,
            count: 0,
        });
        if now.duration_since(entry.started_at) >= self.window {
            *entry = RateLimitWindow {
                started_at: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.state.lock().await.by_client.len()
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing a fixed request-per-window limit per client IP.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !rate_limit.admit(client).await {
        tracing::debug!(client = ?client, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "rate limit exceeded",
                },
            }),
        )
            .into_response();
    }

    next.run(req).await
}

/// Marks every response as uncacheable. Metrics change on reload, so
/// browsers and proxies must always come back to the server.
pub fn no_store() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(CACHE_CONTROL, HeaderValue::from_static("no-store"))
}
