//! # lum-registry — HWID Lifecycle Core
//!
//! The stateful heart of the Luminous gate. Tracks hardware identifiers
//! submitted by clients and classifies each as pending, whitelisted, or
//! blacklisted; the classification gates access to the protected
//! application.
//!
//! ## Components
//!
//! - **[`Registry`]** ([`registry`]): owns all classification state behind
//!   a single mutation lock. Submission, explicit whitelist/blacklist with
//!   mutual exclusion, deletion, ordered listing, and read-only checks.
//!
//! - **Auto-promotion scheduler** ([`promotion`]): every accepted
//!   submission arms a one-shot deferred task that promotes the HWID to
//!   whitelisted after a fixed delay — unless an explicit staff action or
//!   deletion got there first. The firing re-checks current state under
//!   the registry lock, so explicit action always wins the race.
//!
//! - **Backup reconciler** ([`reconcile`]): consults an external backup
//!   authority and applies its verdict locally when the authority has no
//!   record either. Fails closed — a failed or timed-out authority call
//!   mutates nothing.
//!
//! ## Concurrency
//!
//! One `parking_lot::Mutex` serializes every mutation, including timer
//! firings. The lock is never held across an `.await`; outbound authority
//! calls complete first and their result is applied in a single lock
//! acquisition afterwards.

pub mod promotion;
pub mod reconcile;
pub mod record;
pub mod registry;

pub use promotion::schedule;
pub use reconcile::{
    BackupAuthority, BackupError, BackupVerdict, Classification, ReconcileError, Reconciler,
    SyncOutcome,
};
pub use record::{
    ClassificationMeta, HwidRecord, HwidStatus, HwidVerdict, RemainingTime,
    DEFAULT_PROMOTION_DELAY,
};
pub use registry::{PendingTicket, Registry, RegistryError};
