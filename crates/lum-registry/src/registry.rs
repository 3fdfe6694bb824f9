//! The registry: single owner of all HWID classification state.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use lum_core::Hwid;
use parking_lot::Mutex;

use crate::reconcile::Classification;
use crate::record::{
    ClassificationMeta, HwidRecord, HwidStatus, HwidVerdict, RemainingTime,
    DEFAULT_PROMOTION_DELAY,
};

/// Errors raised by registry mutations.
///
/// All are recoverable and local; none is fatal to the process. Reads
/// (`check`, `list`) never error — absence is a normal state value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Submission targeted a HWID that is already known. Invalid HWIDs
    /// (empty, oversized) are rejected earlier, at `Hwid` construction,
    /// and fold into the same client-facing error class.
    #[error("hwid is invalid or already registered")]
    DuplicateOrInvalid,

    /// The operation targeted a HWID the registry has never seen.
    #[error("unknown hwid: {0}")]
    NotFound(String),
}

/// Handle returned by a successful submission.
///
/// Carries everything the promotion scheduler needs to arm the deferred
/// auto-whitelist for this registration. The epoch ties the timer to this
/// specific submission: after a delete-then-resubmit, the stale timer's
/// epoch no longer matches and its firing is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTicket {
    /// The newly registered HWID.
    pub hwid: Hwid,
    /// Submission generation captured at registration.
    pub epoch: u64,
    /// How long until the auto-promotion should fire.
    pub promote_after: Duration,
}

#[derive(Debug, Default)]
struct RegistryInner {
    records: HashMap<Hwid, HwidRecord>,
    /// Insertion order of first submission, for ordered listing.
    order: Vec<Hwid>,
    next_epoch: u64,
}

/// In-memory store of known HWIDs and their classification records.
///
/// All mutations serialize through one coarse lock — sufficient for the
/// data volumes of this domain and immune to the lost-update races that
/// independent per-list mutation would invite. The lock is internal;
/// callers see plain `&self` methods and never hold it across `.await`.
#[derive(Debug)]
pub struct Registry {
    promotion_delay: Duration,
    inner: Mutex<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry with the standard 5-minute promotion delay.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_PROMOTION_DELAY)
    }

    /// Registry with a custom promotion delay (deployment tuning, tests).
    pub fn with_delay(promotion_delay: Duration) -> Self {
        Self {
            promotion_delay,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// The configured auto-promotion delay.
    pub fn promotion_delay(&self) -> Duration {
        self.promotion_delay
    }

    /// Register a new HWID as pending.
    ///
    /// Fails with [`RegistryError::DuplicateOrInvalid`] when the HWID is
    /// already known. On success the caller is expected to hand the
    /// returned ticket to [`crate::promotion::schedule`].
    pub fn submit(&self, hwid: Hwid) -> Result<PendingTicket, RegistryError> {
        let mut inner = self.inner.lock();
        if inner.records.contains_key(&hwid) {
            return Err(RegistryError::DuplicateOrInvalid);
        }
        let epoch = inner.next_epoch;
        inner.next_epoch += 1;
        inner.records.insert(
            hwid.clone(),
            HwidRecord {
                registered_at: Utc::now(),
                epoch,
                status: HwidStatus::Pending,
            },
        );
        inner.order.push(hwid.clone());
        tracing::info!(%hwid, epoch, "hwid registered, pending auto-promotion");
        Ok(PendingTicket {
            hwid,
            epoch,
            promote_after: self.promotion_delay,
        })
    }

    /// Explicitly whitelist a known HWID.
    ///
    /// Overwrites any existing classification (including a blacklist) —
    /// re-whitelisting is an idempotent success. `registered_at` is left
    /// untouched.
    pub fn set_whitelisted(
        &self,
        hwid: &Hwid,
        meta: ClassificationMeta,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(hwid)
            .ok_or_else(|| RegistryError::NotFound(hwid.to_string()))?;
        record.status = HwidStatus::Whitelisted(meta);
        tracing::info!(%hwid, "hwid whitelisted");
        Ok(())
    }

    /// Explicitly blacklist a known HWID.
    ///
    /// Overwrites any existing classification, including the metadata of
    /// a prior blacklist — a repeat call with new metadata updates the
    /// record rather than silently doing nothing.
    pub fn set_blacklisted(
        &self,
        hwid: &Hwid,
        meta: ClassificationMeta,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let record = inner
            .records
            .get_mut(hwid)
            .ok_or_else(|| RegistryError::NotFound(hwid.to_string()))?;
        record.status = HwidStatus::Blacklisted(meta);
        tracing::info!(%hwid, "hwid blacklisted");
        Ok(())
    }

    /// Remove a HWID from all state.
    ///
    /// Discards the record (classification and registration timestamp)
    /// and its place in the listing order. Any outstanding promotion
    /// timer becomes a no-op: its captured epoch can no longer match.
    pub fn delete(&self, hwid: &Hwid) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if inner.records.remove(hwid).is_none() {
            return Err(RegistryError::NotFound(hwid.to_string()));
        }
        inner.order.retain(|h| h != hwid);
        tracing::info!(%hwid, "hwid deleted");
        Ok(())
    }

    /// All known HWIDs in first-submission order.
    pub fn list(&self) -> Vec<Hwid> {
        self.inner.lock().order.clone()
    }

    /// Number of known HWIDs.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// True when no HWID is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only classification lookup. Never errors.
    ///
    /// Pending HWIDs report as not-found with the time left until their
    /// auto-promotion; HWIDs that were never submitted (or were deleted)
    /// report [`RemainingTime::Unknown`].
    pub fn check(&self, hwid: &Hwid) -> HwidVerdict {
        let inner = self.inner.lock();
        match inner.records.get(hwid) {
            Some(record) => match &record.status {
                HwidStatus::Whitelisted(meta) => HwidVerdict::Whitelisted(meta.clone()),
                HwidStatus::Blacklisted(meta) => HwidVerdict::Blacklisted(meta.clone()),
                HwidStatus::Pending => HwidVerdict::NotFound {
                    remaining: RemainingTime::from_deadline(
                        record.registered_at,
                        self.promotion_delay,
                        Utc::now(),
                    ),
                },
            },
            None => HwidVerdict::NotFound {
                remaining: RemainingTime::Unknown,
            },
        }
    }

    /// Timer firing: promote to whitelisted if nothing preempted it.
    ///
    /// Effective only when the record still exists, is still pending,
    /// and carries the epoch the timer captured at submission. Explicit
    /// whitelist/blacklist/delete all invalidate the firing. Returns
    /// whether the promotion happened.
    pub fn auto_promote(&self, hwid: &Hwid, epoch: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.records.get_mut(hwid) {
            Some(record) if record.status == HwidStatus::Pending && record.epoch == epoch => {
                record.status = HwidStatus::Whitelisted(ClassificationMeta::default());
                true
            }
            _ => false,
        }
    }

    /// Apply a backup-authority verdict atomically.
    ///
    /// Registers the HWID when unknown (no promotion timer armed — the
    /// verdict is immediate and authoritative) and classifies it in the
    /// same lock acquisition, so reconciliation never leaves partial
    /// state. `true` whitelists, `false` blacklists, both with empty
    /// metadata.
    pub fn apply_backup_verdict(&self, hwid: &Hwid, whitelisted: bool) -> Classification {
        let mut inner = self.inner.lock();
        if !inner.records.contains_key(hwid) {
            let epoch = inner.next_epoch;
            inner.next_epoch += 1;
            inner.records.insert(
                hwid.clone(),
                HwidRecord {
                    registered_at: Utc::now(),
                    epoch,
                    status: HwidStatus::Pending,
                },
            );
            inner.order.push(hwid.clone());
        }
        // Known to exist now; borrow checker aside, this cannot miss.
        if let Some(record) = inner.records.get_mut(hwid) {
            // Last write wins, but an overwritten staff classification
            // deserves operator attention.
            if !matches!(record.status, HwidStatus::Pending) {
                tracing::warn!(
                    %hwid,
                    previous = ?record.status,
                    "backup verdict overwrote an existing classification"
                );
            }
            record.status = if whitelisted {
                HwidStatus::Whitelisted(ClassificationMeta::default())
            } else {
                HwidStatus::Blacklisted(ClassificationMeta::default())
            };
        }
        if whitelisted {
            Classification::Whitelisted
        } else {
            Classification::Blacklisted
        }
    }
}
