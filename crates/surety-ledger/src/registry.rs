//! # Airline Registry
//!
//! Consortium admission, funding, and peer approval.
//!
//! ## Admission
//!
//! While fewer than `founding_threshold` airlines have been counted, a
//! registration creates a `Registered` airline directly and bumps the
//! counter. From then on new airlines start `PendingApproval` and need
//! `⌊counter / 2⌋` votes, a number frozen on the record at registration.
//!
//! An airline becomes **active** only once it is both `Registered` and
//! funded with at least the membership fee.
//!
//! ## Counter semantics
//!
//! `total_registered_airlines` moves only on direct registration. Airlines
//! that reach `Registered` through voting are not counted, and registering
//! an identity again overwrites its record and, below the threshold, counts
//! it again.

use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount};

use crate::audit::LedgerEvent;
use crate::error::LedgerError;
use crate::guard;
use crate::store::LedgerStore;
use crate::transaction::Transaction;

// ─── Airline State ───────────────────────────────────────────────────

/// Admission state of an airline.
///
/// `PendingApproval → Registered`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirlineState {
    /// Awaiting peer votes.
    #[default]
    PendingApproval,
    /// Admitted to the consortium.
    Registered,
}

impl AirlineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Registered => "REGISTERED",
        }
    }
}

impl std::fmt::Display for AirlineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Airline Record ──────────────────────────────────────────────────

/// An airline's consortium record.
///
/// The default value is the zero-valued projection returned for identities
/// that were never registered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Airline {
    pub name: String,
    pub state: AirlineState,
    pub is_funded: bool,
    /// Frozen at registration.
    pub min_required_votes: u64,
    /// Never decreases.
    pub positive_received_votes: u64,
    pub balance: Amount,
}

impl Airline {
    fn founding(name: String) -> Self {
        Self {
            name,
            state: AirlineState::Registered,
            ..Self::default()
        }
    }

    fn candidate(name: String, min_required_votes: u64) -> Self {
        Self {
            name,
            state: AirlineState::PendingApproval,
            min_required_votes,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == AirlineState::Registered && self.is_funded
    }

    fn add_funding(&mut self, amount: Amount) -> Result<(Amount, Amount), LedgerError> {
        let old = self.balance;
        self.balance = old.checked_add(amount)?;
        self.is_funded = true;
        Ok((old, self.balance))
    }

    fn record_vote(&mut self) {
        self.positive_received_votes = self.positive_received_votes.saturating_add(1);
        if self.positive_received_votes >= self.min_required_votes {
            self.state = AirlineState::Registered;
        }
    }
}

// ─── Queries ─────────────────────────────────────────────────────────

/// Votes a registration would need right now.
///
/// Zero below the founding threshold, `⌊total / 2⌋` from the threshold on.
pub fn required_votes(total_registered: u64, founding_threshold: u64) -> u64 {
    if total_registered < founding_threshold {
        0
    } else {
        total_registered / 2
    }
}

/// The airline's record, or the zero-valued default for an unknown identity.
pub fn fetch_airline_status(store: &LedgerStore, id: &AccountId) -> Airline {
    store.airline(id).cloned().unwrap_or_default()
}

// ─── Operations ──────────────────────────────────────────────────────

pub(crate) fn register_airline(
    tx: &mut Transaction,
    name: &str,
    airline: AccountId,
    requestor: AccountId,
) -> Result<Airline, LedgerError> {
    guard::require_operational(tx.store())?;
    guard::require_active(tx.store(), &requestor)?;

    let total = tx.store().total_registered_airlines;
    let threshold = tx.store().founding_threshold;
    let record = if total < threshold {
        tx.count_registration();
        Airline::founding(name.to_string())
    } else {
        Airline::candidate(name.to_string(), required_votes(total, threshold))
    };
    tx.insert_airline(airline, record.clone());

    tx.emit(LedgerEvent::AirlineRegistered {
        airline,
        name: record.name.clone(),
        requestor,
        state: record.state,
        min_required_votes: record.min_required_votes,
    })?;
    Ok(record)
}

pub(crate) fn fund_airline(
    tx: &mut Transaction,
    airline: AccountId,
    attached: Amount,
) -> Result<Airline, LedgerError> {
    guard::require_operational(tx.store())?;

    let required = tx.store().membership_fee;
    let record = tx
        .airline_mut(&airline)
        .ok_or(LedgerError::UnknownAirline { account: airline })?;
    // The fee is the bar for becoming funded; top-ups of a funded airline
    // may be any amount.
    if !record.is_funded && attached < required {
        return Err(LedgerError::InsufficientFee { required, attached });
    }
    let (old_balance, new_balance) = record.add_funding(attached)?;
    let snapshot = record.clone();
    tx.deposit(attached)?;

    tx.emit(LedgerEvent::AirlineFunded {
        airline,
        old_balance,
        new_balance,
    })?;
    Ok(snapshot)
}

pub(crate) fn approve_airline(
    tx: &mut Transaction,
    candidate: AccountId,
    requestor: AccountId,
) -> Result<Airline, LedgerError> {
    guard::require_operational(tx.store())?;
    guard::require_active(tx.store(), &requestor)?;
    if candidate == requestor {
        return Err(LedgerError::SelfVote { account: requestor });
    }

    let record = tx
        .airline_mut(&candidate)
        .ok_or(LedgerError::UnknownAirline { account: candidate })?;
    record.record_vote();
    let snapshot = record.clone();

    tx.emit(LedgerEvent::AirlineVoteRecorded {
        candidate,
        voter: requestor,
        positive_received_votes: snapshot.positive_received_votes,
        min_required_votes: snapshot.min_required_votes,
        state: snapshot.state,
    })?;
    Ok(snapshot)
}
