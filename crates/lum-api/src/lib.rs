//! # lum-api — Axum API Surface for the Luminous HWID Gate
//!
//! Thin transport over the [`lum_registry`] core: request parsing, input
//! sanitization (via the [`lum_core::Hwid`] newtype), rate limiting,
//! CORS, and error-status-code mapping. All state and timing lives in
//! the registry crate; this layer wires it to HTTP.
//!
//! ## API Surface
//!
//! | Route                        | Module              | Purpose              |
//! |------------------------------|---------------------|----------------------|
//! | `GET  /api/version`          | [`routes::version`] | Service version      |
//! | `GET  /`                     | [`routes::version`] | Redirect to version  |
//! | `GET  /api/hwids`            | [`routes::hwids`]   | Ordered HWID list    |
//! | `POST /api/hwids`            | [`routes::hwids`]   | Submit (arms timer)  |
//! | `PUT  /api/hwids/whitelist`  | [`routes::hwids`]   | Explicit whitelist   |
//! | `PUT  /api/hwids/blacklist`  | [`routes::hwids`]   | Explicit blacklist   |
//! | `DELETE /api/hwids`          | [`routes::hwids`]   | Delete               |
//! | `GET  /api/hwids/check/:hwid`| [`routes::hwids`]   | Classification check |
//! | `POST /api/hwids/sync`       | [`routes::sync`]    | Backup reconciliation|
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → RateLimitMiddleware → Handler
//! ```
//!
//! Health probes (`/health/*`) are mounted outside the middleware stack
//! so probes never burn rate-limit quota.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let limiter = RateLimiter::new(RateLimitConfig::from_env());

    // Body size limit: 64 KiB. Every payload here is a short identifier
    // plus a few free-text fields.
    let api = Router::new()
        .merge(routes::version::router())
        .merge(routes::hwids::router())
        .merge(routes::sync::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(from_fn(rate_limit_middleware))
        .layer(Extension(limiter))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Health probes bypass rate limiting and CORS.
    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(probes).merge(api)
}

/// Liveness probe — 200 whenever the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the registry lock is acquirable.
///
/// A missing backup authority does not fail readiness: the service is
/// designed to run standalone, with sync endpoints answering 503.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.registry.len();
    (StatusCode::OK, "ready")
}
