//! # lum-backup-client — Backup Authority HTTP Client
//!
//! Typed reqwest client for the external backup authority: the remote
//! service the reconciler consults when a HWID is absent locally, and the
//! recipient of fire-and-forget auto-promotion notices.
//!
//! ## Wire protocol
//!
//! - `POST {base}/api/backup/check` with `{"hwid": ..., "status": bool}`
//!   → `200 {"found": bool}`
//! - `POST {base}/api/backup/auto-whitelisted` with `{"hwid": ...}`
//!   → any 2xx acknowledges
//!
//! ## Timeout & retry
//!
//! Every request carries a per-request timeout (default 10s) — the
//! reconciler must never block indefinitely on the authority. Transient
//! transport failures are retried with exponential backoff under the
//! configured [`RetryPolicy`]; non-2xx responses and decode failures
//! are returned immediately.

mod retry;

pub use retry::RetryPolicy;

use std::time::Duration;

use lum_core::Hwid;
use lum_registry::{BackupAuthority, BackupError, BackupVerdict};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL did not parse.
    #[error("invalid backup authority URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The rejected URL string.
        url: String,
        /// The parse failure.
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Configuration for the backup authority client.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Base URL of the authority (e.g. `https://backup.example.net`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Backoff retry tuning for transport failures.
    pub retry: RetryPolicy,
}

impl BackupConfig {
    /// Configuration with the default timeout and retry policy.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    hwid: &'a str,
    status: bool,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    found: bool,
}

#[derive(Debug, Serialize)]
struct AutoWhitelistedNotice<'a> {
    hwid: &'a str,
}

/// HTTP implementation of [`BackupAuthority`].
///
/// Wraps a `reqwest::Client` with the authority's base URL and timeout.
/// `Send + Sync` by construction; share it behind an `Arc` across
/// handler tasks and promotion timers.
#[derive(Debug, Clone)]
pub struct HttpBackupClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpBackupClient {
    /// Build a client from configuration. Validates the base URL up
    /// front so a typo fails at startup, not on the first sync.
    pub fn new(config: BackupConfig) -> Result<Self, ConfigError> {
        Url::parse(&config.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            retry: config.retry,
        })
    }

    /// POST a JSON body and map transport/status failures consistently.
    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        operation: &str,
    ) -> Result<reqwest::Response, BackupError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .retry
            .run(|| self.client.post(&url).json(body).send())
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackupError::Transport(format!("{operation}: request timed out"))
                } else {
                    BackupError::Transport(format!("{operation}: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackupError::Api { status, body });
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl BackupAuthority for HttpBackupClient {
    async fn lookup(&self, hwid: &Hwid, status: bool) -> Result<BackupVerdict, BackupError> {
        let resp = self
            .post_json(
                "/api/backup/check",
                &CheckRequest {
                    hwid: hwid.as_str(),
                    status,
                },
                "lookup",
            )
            .await?;
        let parsed: CheckResponse = resp
            .json()
            .await
            .map_err(|e| BackupError::InvalidResponse(e.to_string()))?;
        Ok(BackupVerdict {
            found: parsed.found,
        })
    }

    async fn notify_auto_whitelisted(&self, hwid: &Hwid) -> Result<(), BackupError> {
        self.post_json(
            "/api/backup/auto-whitelisted",
            &AutoWhitelistedNotice {
                hwid: hwid.as_str(),
            },
            "notify_auto_whitelisted",
        )
        .await?;
        Ok(())
    }
}
