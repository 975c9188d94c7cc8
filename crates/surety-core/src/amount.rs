//! # Amounts
//!
//! [`Amount`] is a non-negative quantity of base units (1 ether = 10^18).
//! Every operation the ledger performs on balances goes through the checked
//! helpers here, so overflow is an error rather than a silent wrap.
//!
//! Serialized as a decimal string because JSON numbers cannot carry the full
//! `u128` range. Deserialization also accepts a plain integer for
//! convenience.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ArithmeticError, ValidationError};

/// Base units per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// A non-negative quantity of base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero base units.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw base-unit count.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Whole ethers expressed in base units. Saturates at `u128::MAX`.
    pub const fn ether(whole: u128) -> Self {
        Self(whole.saturating_mul(WEI_PER_ETHER))
    }

    /// The raw base-unit count.
    pub const fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Overflow {
                op: "+",
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(ArithmeticError::Underflow {
                lhs: self.0,
                rhs: rhs.0,
            })
    }

    /// Multiply by `numerator / denominator`, rounding toward zero.
    ///
    /// The multiplication happens first so `scale(3, 2)` on 1 yields 1, not 0.
    pub fn scale(self, numerator: u128, denominator: u128) -> Result<Self, ArithmeticError> {
        if denominator == 0 {
            return Err(ArithmeticError::DivisionByZero { value: self.0 });
        }
        let product = self
            .0
            .checked_mul(numerator)
            .ok_or(ArithmeticError::Overflow {
                op: "*",
                lhs: self.0,
                rhs: numerator,
            })?;
        Ok(Self(product / denominator))
    }

    /// Parse a decimal base-unit string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAmount {
                value: s.to_string(),
                reason: "expected a non-negative decimal integer".to_string(),
            });
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|e| ValidationError::InvalidAmount {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Accepted wire forms for an amount.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Integer(u64),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            AmountRepr::Integer(n) => Ok(Self::from(n)),
        }
    }
}
