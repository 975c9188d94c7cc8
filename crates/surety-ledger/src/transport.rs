//! # Payout Transport
//!
//! The outward leg of `pay`. The ledger hands the recipient and amount to a
//! [`PayoutTransport`] as the last step of the call; if the transport
//! refuses, the whole call is rolled back.
//!
//! [`PayoutJournal`] is the in-process rail: it accepts every transfer and
//! keeps a receipt for each.

use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount, Timestamp};
use thiserror::Error;
use uuid::Uuid;

/// Why a transfer did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The recipient cannot receive funds.
    #[error("recipient {recipient} rejected the transfer: {reason}")]
    Rejected {
        /// Intended recipient.
        recipient: AccountId,
        /// Rail-specific reason.
        reason: String,
    },

    /// The rail itself is down.
    #[error("payout rail unavailable: {0}")]
    Unavailable(String),
}

/// Proof that a transfer was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub reference: Uuid,
    pub recipient: AccountId,
    pub amount: Amount,
    pub settled_at: Timestamp,
}

/// Moves funds out of the ledger.
pub trait PayoutTransport: Send {
    fn transfer(
        &mut self,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<PayoutReceipt, TransportError>;
}

/// In-process transport that records every disbursement.
#[derive(Debug, Clone, Default)]
pub struct PayoutJournal {
    disbursements: Vec<PayoutReceipt>,
}

impl PayoutJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disbursements(&self) -> &[PayoutReceipt] {
        &self.disbursements
    }

    /// Sum of every disbursement, saturating at `u128::MAX`.
    pub fn total_disbursed(&self) -> Amount {
        Amount::new(
            self.disbursements
                .iter()
                .fold(0u128, |acc, r| acc.saturating_add(r.amount.value())),
        )
    }
}

impl PayoutTransport for PayoutJournal {
    fn transfer(
        &mut self,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<PayoutReceipt, TransportError> {
        let receipt = PayoutReceipt {
            reference: Uuid::new_v4(),
            recipient: *recipient,
            amount,
            settled_at: Timestamp::now(),
        };
        tracing::info!(
            reference = %receipt.reference,
            recipient = %recipient,
            amount = %amount,
            "payout disbursed"
        );
        self.disbursements.push(receipt.clone());
        Ok(receipt)
    }
}
