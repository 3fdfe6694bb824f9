//! # API Route Modules
//!
//! - `hwids` — HWID lifecycle: submission, ordered listing, explicit
//!   whitelist/blacklist, deletion, and classification checks.
//! - `sync` — reconciliation of a HWID against the backup authority.
//! - `version` — service version route and the root redirect to it.

pub mod hwids;
pub mod sync;
pub mod version;
