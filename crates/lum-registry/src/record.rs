//! Per-HWID classification records and the remaining-time countdown.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed delay before a still-pending HWID is auto-promoted to
/// whitelisted: 5 minutes.
pub const DEFAULT_PROMOTION_DELAY: Duration = Duration::from_secs(5 * 60);

/// Optional free-text fields attached to an explicit classification.
///
/// Present only when a staff member whitelists or blacklists a HWID by
/// hand; auto-promotion stores an empty set. All fields are stored
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMeta {
    /// Why the HWID was classified (e.g. "cheating").
    pub reason: Option<String>,
    /// Operator-defined code surfaced to the client.
    pub custom_code: Option<String>,
    /// Name of the staff member who acted.
    pub staff_name: Option<String>,
}

impl ClassificationMeta {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.reason.is_none() && self.custom_code.is_none() && self.staff_name.is_none()
    }
}

/// Current classification of a known HWID.
///
/// A HWID holds exactly one status at a time; transitioning into one
/// state structurally removes it from the others. This is the enum-field
/// rendition of the invariant — the duplicate-membership bugs possible
/// with three independent lists cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwidStatus {
    /// Submitted, awaiting auto-promotion or explicit action.
    Pending,
    /// Allowed through the gate.
    Whitelisted(ClassificationMeta),
    /// Denied at the gate.
    Blacklisted(ClassificationMeta),
}

/// One record per known HWID.
#[derive(Debug, Clone)]
pub struct HwidRecord {
    /// Timestamp of first submission. Set once, never updated by later
    /// transitions; drives the remaining-time countdown while pending.
    pub registered_at: DateTime<Utc>,
    /// Submission generation. A delete-then-resubmit bumps the epoch so
    /// the first submission's stale promotion timer cannot act on the
    /// second registration.
    pub epoch: u64,
    /// Current classification.
    pub status: HwidStatus,
}

/// Time left until a pending HWID auto-promotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingTime {
    /// No registration timestamp exists — the HWID was never submitted.
    Unknown,
    /// Whole minutes and seconds until promotion, clamped at zero.
    Until {
        /// Whole minutes remaining.
        minutes: u64,
        /// Whole seconds remaining after the minutes.
        seconds: u64,
    },
}

impl RemainingTime {
    /// Compute the countdown from the registration timestamp and the
    /// promotion delay. Never goes negative: an overdue timer reads as
    /// zero until it fires.
    pub fn from_deadline(registered_at: DateTime<Utc>, delay: Duration, now: DateTime<Utc>) -> Self {
        let deadline = registered_at + chrono::Duration::from_std(delay).unwrap_or_default();
        let left = (deadline - now).num_seconds().max(0) as u64;
        Self::Until {
            minutes: left / 60,
            seconds: left % 60,
        }
    }
}

impl std::fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Until { minutes, seconds } => write!(f, "{minutes} minutes {seconds} seconds"),
        }
    }
}

/// Read-only classification verdict returned by the query facade.
///
/// Pending HWIDs deliberately read as `NotFound` with a countdown — to a
/// client, an unclassified HWID is indistinguishable from an unknown one
/// except for the remaining time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwidVerdict {
    /// Allowed, with whatever metadata the explicit action carried.
    Whitelisted(ClassificationMeta),
    /// Denied, with whatever metadata the explicit action carried.
    Blacklisted(ClassificationMeta),
    /// Pending or never submitted.
    NotFound {
        /// Countdown for pending HWIDs; `Unknown` for unsubmitted ones.
        remaining: RemainingTime,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time_just_after_submit() {
        let registered = Utc::now();
        let now = registered + chrono::Duration::seconds(1);
        let remaining = RemainingTime::from_deadline(registered, DEFAULT_PROMOTION_DELAY, now);
        assert_eq!(
            remaining,
            RemainingTime::Until {
                minutes: 4,
                seconds: 59
            }
        );
        assert_eq!(remaining.to_string(), "4 minutes 59 seconds");
    }

    #[test]
    fn remaining_time_at_submit_is_full_delay() {
        let registered = Utc::now();
        let remaining =
            RemainingTime::from_deadline(registered, DEFAULT_PROMOTION_DELAY, registered);
        assert_eq!(
            remaining,
            RemainingTime::Until {
                minutes: 5,
                seconds: 0
            }
        );
    }

    #[test]
    fn remaining_time_clamps_at_zero() {
        let registered = Utc::now();
        let now = registered + chrono::Duration::seconds(600);
        let remaining = RemainingTime::from_deadline(registered, DEFAULT_PROMOTION_DELAY, now);
        assert_eq!(
            remaining,
            RemainingTime::Until {
                minutes: 0,
                seconds: 0
            }
        );
        assert_eq!(remaining.to_string(), "0 minutes 0 seconds");
    }

    #[test]
    fn unknown_displays_literal_marker() {
        assert_eq!(RemainingTime::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn empty_meta_reports_empty() {
        assert!(ClassificationMeta::default().is_empty());
        let meta = ClassificationMeta {
            reason: Some("cheating".into()),
            ..Default::default()
        };
        assert!(!meta.is_empty());
    }
}
