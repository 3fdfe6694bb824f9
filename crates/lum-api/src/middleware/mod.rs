//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`rate_limit`]: fixed-window per-client request limiting.
//!
//! Request tracing and CORS come straight from `tower-http` layers wired
//! in `lib.rs`.

pub mod rate_limit;
