//! Backup reconciler: consults the external backup authority and applies
//! its verdict to the registry when the authority has no record either.

use std::sync::Arc;

use lum_core::Hwid;
use serde::{Deserialize, Serialize};

use crate::registry::Registry;

/// Failures talking to the backup authority.
///
/// Mirrors the transport/API/decode split of any outbound HTTP
/// dependency. All variants surface to callers as
/// [`ReconcileError::BackupUnavailable`] — the reconciler fails closed
/// and never guesses a classification.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Connection failure or timeout before a response arrived.
    #[error("backup authority unreachable: {0}")]
    Transport(String),

    /// The authority answered with a non-success status.
    #[error("backup authority returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt for diagnostics.
        body: String,
    },

    /// The authority answered 2xx but the body did not parse.
    #[error("invalid response from backup authority: {0}")]
    InvalidResponse(String),
}

/// The authority's answer to a lookup: does it already hold a record?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupVerdict {
    /// True when the authority is the system of record for this HWID.
    pub found: bool,
}

/// The external backup authority, behind a trait so the reconciler and
/// the promotion scheduler are testable without a network.
///
/// Implementations must be `Send + Sync`; they are shared behind an
/// `Arc` across handler tasks and promotion timers.
#[async_trait::async_trait]
pub trait BackupAuthority: Send + Sync {
    /// Ask whether the authority already holds a record for `hwid`,
    /// forwarding the caller's proposed `status` alongside.
    async fn lookup(&self, hwid: &Hwid, status: bool) -> Result<BackupVerdict, BackupError>;

    /// Tell the authority a HWID was auto-whitelisted locally.
    /// Callers treat this as fire-and-forget.
    async fn notify_auto_whitelisted(&self, hwid: &Hwid) -> Result<(), BackupError>;
}

/// Reconciliation failures. Local state is untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The authority call failed or timed out.
    #[error("backup authority unavailable: {source}")]
    BackupUnavailable {
        /// The underlying authority failure.
        #[source]
        source: BackupError,
    },
}

/// Which way a backup verdict classified a HWID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Allowed through the gate.
    Whitelisted,
    /// Denied at the gate.
    Blacklisted,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whitelisted => write!(f, "whitelisted"),
            Self::Blacklisted => write!(f, "blacklisted"),
        }
    }
}

/// Result of a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The authority already holds a record; it is the system of record
    /// and no local state was touched.
    Found,
    /// The authority had no record; the HWID was registered locally (if
    /// unknown) and classified per the caller's status.
    Applied {
        /// The classification that was applied.
        classification: Classification,
    },
}

/// Applies backup-authority verdicts to the registry.
///
/// The outbound call runs without the registry lock; the verdict is
/// applied atomically afterwards, re-validated against whatever the
/// local state is by then.
pub struct Reconciler {
    registry: Arc<Registry>,
    authority: Arc<dyn BackupAuthority>,
}

impl Reconciler {
    /// Build a reconciler over a shared registry and authority.
    pub fn new(registry: Arc<Registry>, authority: Arc<dyn BackupAuthority>) -> Self {
        Self {
            registry,
            authority,
        }
    }

    /// Reconcile one HWID against the backup authority.
    ///
    /// See [`SyncOutcome`] for the two success shapes. Authority failure
    /// or timeout yields [`ReconcileError::BackupUnavailable`] with zero
    /// local mutation.
    pub async fn sync(&self, hwid: &Hwid, status: bool) -> Result<SyncOutcome, ReconcileError> {
        let verdict = self
            .authority
            .lookup(hwid, status)
            .await
            .map_err(|source| ReconcileError::BackupUnavailable { source })?;

        if verdict.found {
            tracing::debug!(%hwid, "backup authority holds a record, no local action");
            return Ok(SyncOutcome::Found);
        }

        let classification = self.registry.apply_backup_verdict(hwid, status);
        tracing::info!(%hwid, ?classification, "backup verdict applied locally");
        Ok(SyncOutcome::Applied { classification })
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}
