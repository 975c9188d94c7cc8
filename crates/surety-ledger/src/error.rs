//! # Ledger Error Types
//!
//! Every rejected call surfaces exactly one [`LedgerError`]. Because each
//! entry point runs inside a transaction, an error also guarantees that no
//! write from the call is observable afterwards.

use surety_core::{AccountId, Amount, ArithmeticError, CanonicalizationError};
use thiserror::Error;

/// Errors arising from ledger entry points.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Only the ledger owner may toggle the operational flag.
    #[error("caller {caller} is not the ledger owner")]
    NotOwner {
        /// The identity that attempted the owner-only call.
        caller: AccountId,
    },

    /// The ledger is paused; every mutating entry point is rejected.
    #[error("ledger is not operational")]
    NotOperational,

    /// The requestor is neither registered nor funded.
    #[error("account {account} is not an active consortium member")]
    NotActiveMember {
        /// The requestor that failed the membership gate.
        account: AccountId,
    },

    /// The attached funding is below the membership fee.
    #[error("membership fee of {required} not met: attached {attached}")]
    InsufficientFee {
        /// The configured membership fee.
        required: Amount,
        /// The amount the caller attached.
        attached: Amount,
    },

    /// An airline tried to approve its own candidacy.
    #[error("airline {account} cannot approve itself")]
    SelfVote {
        /// The identity that was both candidate and requestor.
        account: AccountId,
    },

    /// The outward transfer was refused by the payout transport.
    #[error("payout of {amount} to {recipient} failed: {reason}")]
    TransferFailed {
        /// Intended recipient.
        recipient: AccountId,
        /// Amount that would have been paid.
        amount: Amount,
        /// Transport-supplied reason.
        reason: String,
    },

    /// Funding or approval addressed an identity with no airline record.
    #[error("airline {account} has never been registered")]
    UnknownAirline {
        /// The unknown identity.
        account: AccountId,
    },

    /// A balance computation left the representable range.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// An audit payload could not be canonicalized.
    #[error("audit canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl LedgerError {
    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::NotOperational => "NOT_OPERATIONAL",
            Self::NotActiveMember { .. } => "NOT_ACTIVE_MEMBER",
            Self::InsufficientFee { .. } => "INSUFFICIENT_FEE",
            Self::SelfVote { .. } => "SELF_VOTE",
            Self::TransferFailed { .. } => "TRANSFER_FAILED",
            Self::UnknownAirline { .. } => "UNKNOWN_AIRLINE",
            Self::Arithmetic(_) => "ARITHMETIC",
            Self::Canonicalization(_) => "CANONICALIZATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = LedgerError::InsufficientFee {
            required: Amount::new(10),
            attached: Amount::new(5),
        };
        assert_eq!(err.to_string(), "membership fee of 10 not met: attached 5");
        assert_eq!(err.kind(), "INSUFFICIENT_FEE");

        let err = LedgerError::SelfVote {
            account: AccountId::ZERO,
        };
        assert!(err.to_string().contains("0x0000000000000000000000000000000000000000"));
    }

    #[test]
    fn arithmetic_errors_convert() {
        let err: LedgerError = ArithmeticError::Underflow { lhs: 1, rhs: 2 }.into();
        assert_eq!(err.kind(), "ARITHMETIC");
    }
}
