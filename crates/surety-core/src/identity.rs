//! # Account and Flight Identifiers
//!
//! Newtype wrappers for the two keys the ledger indexes by. Both validate at
//! construction so a malformed identifier never reaches a store lookup.
//!
//! ## AccountId
//!
//! A 20-byte opaque token. The ledger compares and hashes it and nothing
//! else: it never derives, signs with, or resolves an account. The wire form
//! is `0x` followed by 40 lowercase hex digits; parsing accepts either case
//! and an optional prefix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Width of an [`AccountId`] in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Maximum length of a [`FlightKey`] in bytes.
const MAX_FLIGHT_KEY_LEN: usize = 128;

// ─── AccountId ───────────────────────────────────────────────────────

/// Opaque, caller-supplied account identity (airline or passenger).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The all-zero identity.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Parse a hex identity, with or without a `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidAccountId {
            value: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != ACCOUNT_ID_LEN * 2 {
            return Err(invalid(format!(
                "expected {} hex digits, got {}",
                ACCOUNT_ID_LEN * 2,
                digits.len()
            )));
        }
        if !digits.is_ascii() {
            return Err(invalid("contains non-ASCII characters".to_string()));
        }

        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| invalid(format!("invalid hex at position {}", i * 2)))?;
        }
        Ok(Self(bytes))
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(0x{})", self.to_hex())
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ─── FlightKey ───────────────────────────────────────────────────────

/// Identifier of an insured flight, e.g. `"ND1309-1700000000"`.
///
/// Any non-blank string up to 128 bytes. Surrounding whitespace is trimmed
/// so `" FL1 "` and `"FL1"` address the same policy pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlightKey(String);

impl FlightKey {
    /// Validate and wrap a flight identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidFlightKey {
                value: raw,
                reason: "must not be empty".to_string(),
            });
        }
        if trimmed.len() > MAX_FLIGHT_KEY_LEN {
            return Err(ValidationError::InvalidFlightKey {
                value: raw.clone(),
                reason: format!("must not exceed {MAX_FLIGHT_KEY_LEN} bytes"),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FlightKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FlightKey> for String {
    fn from(key: FlightKey) -> Self {
        key.0
    }
}

impl FromStr for FlightKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x627306090abab3a6e1400e9345bc60c78a8bef57";

    #[test]
    fn account_id_parses_prefixed_hex() {
        let id = AccountId::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        assert_eq!(id.as_bytes()[0], 0x62);
    }

    #[test]
    fn account_id_parses_without_prefix_and_mixed_case() {
        let upper = "627306090ABAB3A6E1400E9345BC60C78A8BEF57";
        let id: AccountId = upper.parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn account_id_rejects_wrong_length() {
        let err = AccountId::parse("0x1234").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAccountId { .. }));
        assert!(err.to_string().contains("expected 40 hex digits"));
    }

    #[test]
    fn account_id_rejects_non_hex() {
        let bad = "0xzz7306090abab3a6e1400e9345bc60c78a8bef57";
        assert!(AccountId::parse(bad).is_err());
    }

    #[test]
    fn account_id_rejects_multibyte_input_without_panicking() {
        let bad = "é".repeat(20);
        assert!(AccountId::parse(&bad).is_err());
    }

    #[test]
    fn account_id_serde_uses_hex_string() {
        let id = AccountId::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn account_id_deserialize_rejects_garbage() {
        let result: Result<AccountId, _> = serde_json::from_str("\"not-an-account\"");
        assert!(result.is_err());
    }

    #[test]
    fn zero_account_is_default() {
        assert_eq!(AccountId::default(), AccountId::ZERO);
        assert_eq!(
            AccountId::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn flight_key_trims_and_validates() {
        let key = FlightKey::new("  FL1 ").unwrap();
        assert_eq!(key.as_str(), "FL1");
        assert!(FlightKey::new("   ").is_err());
        assert!(FlightKey::new("x".repeat(129)).is_err());
        assert!(FlightKey::new("x".repeat(128)).is_ok());
    }

    #[test]
    fn flight_key_deserialize_validates() {
        let ok: FlightKey = serde_json::from_str("\"ND1309\"").unwrap();
        assert_eq!(ok.to_string(), "ND1309");
        let bad: Result<FlightKey, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
