//! # Error Types
//!
//! Errors raised by the core primitives. All use `thiserror` for derived
//! `Display` and `Error` implementations. Higher crates wrap these with
//! `#[from]` rather than flattening them into strings.

use thiserror::Error;

/// A primitive failed its constructor validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account identifiers are 20 bytes rendered as 40 hex digits.
    #[error("invalid account id {value:?}: {reason}")]
    InvalidAccountId {
        /// The rejected input.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Flight keys must be non-empty and bounded.
    #[error("invalid flight key {value:?}: {reason}")]
    InvalidFlightKey {
        /// The rejected input.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Amounts are non-negative base-unit integers.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount {
        /// The rejected input.
        value: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Checked arithmetic on [`Amount`](crate::Amount) failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    /// The result exceeded the representable range.
    #[error("amount overflow: {lhs} {op} {rhs}")]
    Overflow {
        /// Operation symbol.
        op: &'static str,
        /// Left operand.
        lhs: u128,
        /// Right operand.
        rhs: u128,
    },

    /// A subtraction would have gone below zero.
    #[error("amount underflow: {lhs} - {rhs}")]
    Underflow {
        /// Minuend.
        lhs: u128,
        /// Subtrahend.
        rhs: u128,
    },

    /// Scaling by a ratio with a zero denominator.
    #[error("division by zero while scaling {value}")]
    DivisionByZero {
        /// The value being scaled.
        value: u128,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
