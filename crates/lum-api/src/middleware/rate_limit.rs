//! Fixed-window rate limiting keyed by client IP.
//!
//! The window map is bounded by eviction of expired windows on each
//! insert, so an attacker rotating source addresses cannot grow it
//! without bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use parking_lot::Mutex;

use crate::error::{ErrorBody, ErrorDetail};

/// Limiter tuning.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Tuning from `LUM_RATE_LIMIT_MAX` and `LUM_RATE_LIMIT_WINDOW_SECS`,
    /// with defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse = |key: &str| std::env::var(key).ok().and_then(|s| s.parse().ok());
        Self {
            max_requests: parse("LUM_RATE_LIMIT_MAX").unwrap_or(defaults.max_requests),
            window: parse("LUM_RATE_LIMIT_WINDOW_SECS")
                .map(|secs| Duration::from_secs(u64::from(secs)))
                .unwrap_or(defaults.window),
        }
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Shared fixed-window limiter.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Build a limiter with the given tuning.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                windows: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Record a request for `key`. Returns false when the window is
    /// exhausted.
    pub fn check(&self, key: &str) -> bool {
        let config = &self.inner.config;
        let now = Instant::now();
        let mut windows = self.inner.windows.lock();

        match windows.get_mut(key) {
            Some(window) if now.duration_since(window.started) < config.window => {
                if window.count >= config.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.retain(|_, w| now.duration_since(w.started) < config.window);
                windows.insert(
                    key.to_string(),
                    Window {
                        started: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }
}

/// Identify the caller: `x-forwarded-for` when fronted by a proxy,
/// otherwise a single shared bucket.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware: reject over-limit clients with 429.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    if !limiter.check(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        let body = ErrorBody {
            error: ErrorDetail {
                code: "RATE_LIMITED".to_string(),
                message: "too many requests, slow down".to_string(),
            },
        };
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    next.run(request).await
}
