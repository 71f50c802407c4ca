//! Rate limiting middleware
//!
//! Implements fixed-window rate limiting over an in-memory map. Two call
//! sites share the same primitive: a strict per-IP limiter in front of the
//! token-validation route and a per-user limiter in front of the protected
//! routes, keyed by `auth:<ip>` and `user:<username>` respectively.
//!
//! Window bookkeeping uses wall-clock time, matching the response headers
//! (`X-RateLimit-Reset` is an epoch timestamp), so a large clock adjustment
//! can shorten or stretch a window.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    error::ErrorResponse,
    middleware::auth::AuthVerdict,
    routes::metrics::record_rate_limited,
    AppState,
};

/// Window length for every limiter tier
pub const WINDOW: Duration = Duration::from_secs(60);

/// Per-IP request ceiling on the token-validation route
pub const AUTH_ROUTE_LIMIT: u32 = 5;

/// One identifier's counter for the current window
#[derive(Debug)]
struct WindowEntry {
    count: u32,
    /// Epoch milliseconds at which this window ends
    window_reset_at: i64,
}

/// Outcome of a single check-and-consume call
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Ceiling applied to this identifier
    pub limit: u32,
    /// Requests left in the current window (clamped at 0)
    pub remaining: u32,
    /// Epoch seconds (rounded up) when the window resets
    pub reset_at: i64,
    /// Seconds (rounded up) until the caller may retry
    pub retry_after: i64,
}

impl RateLimitDecision {
    /// Rate limit headers attached to every gated response, pass or reject
    pub fn headers(&self) -> Vec<(header::HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                header::HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&self.limit.to_string()).unwrap(),
            ),
            (
                header::HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from_str(&self.remaining.to_string()).unwrap(),
            ),
            (
                header::HeaderName::from_static("x-ratelimit-reset"),
                HeaderValue::from_str(&self.reset_at.to_string()).unwrap(),
            ),
        ];

        if !self.allowed {
            headers.push((
                header::RETRY_AFTER,
                HeaderValue::from_str(&self.retry_after.max(1).to_string()).unwrap(),
            ));
        }

        headers
    }

    fn apply_to(&self, response: &mut Response) {
        let headers = response.headers_mut();
        for (name, value) in self.headers() {
            headers.insert(name, value);
        }
    }
}

/// In-memory fixed-window rate limiter
///
/// Holds at most one entry per identifier. The read-check-increment
/// sequence for one identifier runs under that key's map guard, so
/// concurrent requests against the same identifier never observe a stale
/// count; requests against different identifiers do not serialize.
pub struct RateLimiter {
    entries: DashMap<String, WindowEntry>,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter with the given window length
    pub fn new(window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            window,
        }
    }

    /// Count a request against `identifier` and decide whether to admit it
    ///
    /// The increment is unconditional: a rejected request still consumes a
    /// slot in the window. Exactly `limit` requests per window are admitted.
    pub fn check_and_consume(&self, identifier: &str, limit: u32) -> RateLimitDecision {
        self.check_and_consume_at(identifier, limit, chrono::Utc::now().timestamp_millis())
    }

    fn check_and_consume_at(&self, identifier: &str, limit: u32, now_ms: i64) -> RateLimitDecision {
        let window_ms = self.window.as_millis() as i64;

        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                window_reset_at: now_ms + window_ms,
            });

        if entry.window_reset_at <= now_ms {
            entry.count = 0;
            entry.window_reset_at = now_ms + window_ms;
        }

        entry.count += 1;

        let count = entry.count;
        let window_reset_at = entry.window_reset_at;
        drop(entry);

        RateLimitDecision {
            allowed: count <= limit,
            limit,
            remaining: limit.saturating_sub(count),
            reset_at: div_ceil_ms(window_reset_at),
            retry_after: div_ceil_ms(window_reset_at - now_ms),
        }
    }

    /// Drop every entry whose window has already passed
    ///
    /// Racing with a concurrent increment is harmless: losing an expired
    /// entry is equivalent to that request starting a fresh window.
    pub fn sweep(&self) {
        self.sweep_at(chrono::Utc::now().timestamp_millis());
    }

    fn sweep_at(&self, now_ms: i64) {
        self.entries.retain(|_, entry| entry.window_reset_at > now_ms);
    }

    /// Number of identifiers currently tracked
    pub fn tracked_identifiers(&self) -> usize {
        self.entries.len()
    }

    /// Start the periodic cleanup task, one sweep per window length
    ///
    /// The returned handle is owned by the caller; aborting it at shutdown
    /// stops the sweep.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let limiter = self;
        let period = limiter.window;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; nothing to sweep yet.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let before = limiter.tracked_identifiers();
                limiter.sweep();
                debug!(
                    before,
                    after = limiter.tracked_identifiers(),
                    "Swept expired rate-limit windows"
                );
            }
        })
    }
}

/// Resolve the client IP from proxy headers
///
/// First `X-Forwarded-For` entry, else `X-Real-IP`, else `"unknown"`. The
/// `"unknown"` fallback collapses all such clients into one shared counter.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

/// Build a 429 response with rate limit headers and a `retryAfter` body
pub fn rate_limit_exceeded_response(decision: &RateLimitDecision, message: &str) -> Response {
    let body = ErrorResponse::rate_limited(message, decision.retry_after);
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    decision.apply_to(&mut response);
    response
}

/// Per-IP limiter for the token-validation route
///
/// Runs on every request to `/api/auth/*`, before and regardless of the
/// authentication outcome.
pub async fn auth_route_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers());
    let identifier = format!("auth:{ip}");

    let decision = state
        .rate_limiter
        .check_and_consume(&identifier, AUTH_ROUTE_LIMIT);

    if !decision.allowed {
        warn!(client_ip = %ip, "Auth endpoint rate limit exceeded");
        record_rate_limited("auth");
        return rate_limit_exceeded_response(&decision, "Too many authentication attempts");
    }

    let mut response = next.run(request).await;
    decision.apply_to(&mut response);
    response
}

/// Per-user limiter for protected routes
///
/// Expects `require_auth` to have rejected unauthenticated requests
/// already; if one slips through with no identity it passes untouched.
pub async fn user_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let identity = request
        .extensions()
        .get::<AuthVerdict>()
        .and_then(|v| v.identity.clone());

    let Some(identity) = identity else {
        return next.run(request).await;
    };

    let identifier = format!("user:{}", identity.username);
    let decision = state
        .rate_limiter
        .check_and_consume(&identifier, identity.requests_per_window);

    if !decision.allowed {
        warn!(
            username = %identity.username,
            limit = identity.requests_per_window,
            "User rate limit exceeded"
        );
        record_rate_limited("user");
        return rate_limit_exceeded_response(&decision, "Rate limit exceeded");
    }

    let mut response = next.run(request).await;
    decision.apply_to(&mut response);
    response
}

/// Millisecond value divided by 1000, rounded up
fn div_ceil_ms(ms: i64) -> i64 {
    (ms + 999) / 1000
}
