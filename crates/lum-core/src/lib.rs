//! # lum-core — Identifier Newtypes
//!
//! Domain-primitive newtypes for the Luminous HWID gate. The only
//! identifier in this system is the hardware identifier ([`Hwid`]):
//! an opaque, caller-supplied string that gates access to the protected
//! application.
//!
//! ## Validation
//!
//! [`Hwid`] validates at construction time: surrounding whitespace is
//! trimmed, the result must be non-empty, at most 256 bytes, and free of
//! control characters. Deserialization routes through the constructor so
//! invalid values are rejected at the wire boundary, not silently
//! accepted.

use serde::{Deserialize, Serialize};

/// Maximum accepted HWID length in bytes, after trimming.
///
/// Real hardware identifiers (SMBIOS UUIDs, disk serials, composite
/// fingerprints) are well under this; anything longer is garbage input.
pub const MAX_HWID_LEN: usize = 256;

/// Validation failures for caller-supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The HWID was empty (or whitespace-only).
    #[error("hwid must not be empty")]
    EmptyHwid,

    /// The HWID exceeded [`MAX_HWID_LEN`] bytes.
    #[error("hwid exceeds {MAX_HWID_LEN} bytes (got {len})")]
    HwidTooLong {
        /// Byte length of the rejected value.
        len: usize,
    },

    /// The HWID contained a control character.
    #[error("hwid contains a control character")]
    HwidControlChar,
}

/// A hardware identifier submitted by a client.
///
/// Opaque to the system — uniqueness is enforced by the registry, not by
/// structure. Validated at construction; a held `Hwid` is always well
/// formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hwid(String);

impl Hwid {
    /// Construct a validated HWID. Trims surrounding whitespace first.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyHwid);
        }
        if trimmed.len() > MAX_HWID_LEN {
            return Err(ValidationError::HwidTooLong { len: trimmed.len() });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::HwidControlChar);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Hwid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Hwid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Hwid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deserializes as a plain `String`, then routes through [`Hwid::new`]
/// so invalid values are rejected at deserialization time.
impl<'de> Deserialize<'de> for Hwid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_hwid() {
        let hwid = Hwid::new("ABC123").unwrap();
        assert_eq!(hwid.as_str(), "ABC123");
    }

    #[test]
    fn trims_whitespace() {
        let hwid = Hwid::new("  ABC123\t").unwrap();
        assert_eq!(hwid.as_str(), "ABC123");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Hwid::new(""), Err(ValidationError::EmptyHwid));
        assert_eq!(Hwid::new("   "), Err(ValidationError::EmptyHwid));
    }

    #[test]
    fn rejects_oversized() {
        let raw = "x".repeat(MAX_HWID_LEN + 1);
        assert!(matches!(
            Hwid::new(raw),
            Err(ValidationError::HwidTooLong { .. })
        ));
    }

    #[test]
    fn boundary_length_accepted() {
        let raw = "x".repeat(MAX_HWID_LEN);
        assert!(Hwid::new(raw).is_ok());
    }

    #[test]
    fn rejects_control_chars() {
        assert_eq!(
            Hwid::new("ABC\u{0000}123"),
            Err(ValidationError::HwidControlChar)
        );
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Hwid, _> = serde_json::from_str("\"ABC123\"");
        assert!(ok.is_ok());
        let bad: Result<Hwid, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }

    #[test]
    fn display_and_from_str_round_trip() {
        let hwid: Hwid = "DEADBEEF".parse().unwrap();
        assert_eq!(hwid.to_string(), "DEADBEEF");
    }
}
