//! # Ledger Configuration
//!
//! Parameters fixed at ledger initialization. Nothing here changes for the
//! lifetime of a ledger instance.

use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount};

/// Number of airlines admitted without a vote.
pub const DEFAULT_FOUNDING_THRESHOLD: u64 = 4;

/// Default membership fee: 10 ether.
pub const DEFAULT_MEMBERSHIP_FEE: Amount = Amount::ether(10);

/// Initialization parameters for a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only identity allowed to toggle the operational flag.
    pub owner: AccountId,
    /// Registrations below this count are admitted directly.
    pub founding_threshold: u64,
    /// Minimum amount `fund_airline` accepts.
    pub membership_fee: Amount,
}

impl LedgerConfig {
    /// Configuration with the default threshold and fee.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            founding_threshold: DEFAULT_FOUNDING_THRESHOLD,
            membership_fee: DEFAULT_MEMBERSHIP_FEE,
        }
    }

    pub fn with_membership_fee(mut self, fee: Amount) -> Self {
        self.membership_fee = fee;
        self
    }

    pub fn with_founding_threshold(mut self, threshold: u64) -> Self {
        self.founding_threshold = threshold;
        self
    }
}
