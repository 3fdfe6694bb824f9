//! Retry policy for backup authority calls.
//!
//! Only transient transport failures (connection refused, timeouts)
//! trigger a retry. Status-code handling belongs to the caller — a 5xx
//! from the authority is a definitive answer, not a reason to hammer it.
//!
//! Sync handlers block on the authority, so the policy is part of
//! [`BackupConfig`](crate::BackupConfig): a deployment fronting an
//! interactive UI can trade completeness for latency by dialing
//! retries down to zero.

use std::time::Duration;

/// Backoff retry tuning for authority requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the initial request. Zero disables retry.
    pub attempts: u32,
    /// Delay before the first retry; doubles each subsequent attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries at 200ms, 400ms, 800ms — roughly 1.4s of patience
    /// on top of the request timeouts themselves.
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that sends exactly one request.
    pub fn none() -> Self {
        Self {
            attempts: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Run `f` under this policy. The last attempt's error is returned
    /// as-is.
    pub(crate) async fn run<F, Fut>(&self, f: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut delay = self.base_delay;
        for attempt in 1..=self.attempts {
            match f().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        attempts = self.attempts,
                        "backup authority request failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
        f().await
    }
}
