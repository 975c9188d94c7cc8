//! # Audit Journal
//!
//! Append-only, hash-chained record of every committed ledger event.
//! The journal is written for observers; no ledger decision ever reads it.
//!
//! ## Chain construction
//!
//! Record `n` stores `previous_digest` (the digest of record `n-1`, or 32
//! zero bytes for the first record) and
//!
//! ```text
//! digest = SHA-256(previous_digest ‖ n as u64 BE ‖ canonical({event, recorded_at}))
//! ```
//!
//! Events are staged by a transaction while it runs and sealed into the
//! chain only when the call commits. A rejected call leaves no trace here.

use serde::{Deserialize, Serialize};
use surety_core::{
    sha256_chained, AccountId, Amount, CanonicalBytes, ContentDigest, FlightKey, Timestamp,
};

use crate::error::LedgerError;
use crate::registry::AirlineState;

// ─── Events ──────────────────────────────────────────────────────────

/// Observable ledger events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// The owner set the operational flag.
    OperationalStatusChanged { mode: bool },
    /// An airline record was created or overwritten.
    AirlineRegistered {
        airline: AccountId,
        name: String,
        requestor: AccountId,
        state: AirlineState,
        min_required_votes: u64,
    },
    /// Membership funding was added to an airline's balance.
    AirlineFunded {
        airline: AccountId,
        old_balance: Amount,
        new_balance: Amount,
    },
    /// A consortium member voted for a candidate.
    AirlineVoteRecorded {
        candidate: AccountId,
        voter: AccountId,
        positive_received_votes: u64,
        min_required_votes: u64,
        state: AirlineState,
    },
    /// A passenger bought cover on a flight.
    InsurancePurchased {
        passenger: AccountId,
        flight: FlightKey,
        old_balance: Amount,
        new_balance: Amount,
        participant_count: u64,
    },
    /// A participant of a flight was credited.
    InsureeCredited {
        passenger: AccountId,
        flight: FlightKey,
        withdrawable_balance: Amount,
        balance: Amount,
        participant_count: u64,
    },
    /// A passenger withdrew funds.
    PayoutWithdrawn {
        recipient: AccountId,
        amount: Amount,
        balance: Amount,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OperationalStatusChanged { .. } => "operational_status_changed",
            Self::AirlineRegistered { .. } => "airline_registered",
            Self::AirlineFunded { .. } => "airline_funded",
            Self::AirlineVoteRecorded { .. } => "airline_vote_recorded",
            Self::InsurancePurchased { .. } => "insurance_purchased",
            Self::InsureeCredited { .. } => "insuree_credited",
            Self::PayoutWithdrawn { .. } => "payout_withdrawn",
        }
    }
}

/// The hashed portion of a record.
#[derive(Serialize)]
struct DigestInput<'a> {
    event: &'a LedgerEvent,
    recorded_at: &'a Timestamp,
}

/// An event canonicalized inside a transaction, awaiting commit.
#[derive(Debug, Clone)]
pub struct StagedEvent {
    event: LedgerEvent,
    recorded_at: Timestamp,
    payload: CanonicalBytes,
}

impl StagedEvent {
    pub(crate) fn new(event: LedgerEvent) -> Result<Self, LedgerError> {
        let recorded_at = Timestamp::now();
        let payload = CanonicalBytes::new(&DigestInput {
            event: &event,
            recorded_at: &recorded_at,
        })?;
        Ok(Self {
            event,
            recorded_at,
            payload,
        })
    }

    pub fn event(&self) -> &LedgerEvent {
        &self.event
    }
}

// ─── Journal ─────────────────────────────────────────────────────────

/// One sealed entry of the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
    pub recorded_at: Timestamp,
    pub previous_digest: ContentDigest,
    pub digest: ContentDigest,
}

/// Result of [`AuditJournal::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIntegrity {
    pub total_events: u64,
    /// Sequence numbers whose link or digest does not match.
    pub broken_links: Vec<u64>,
    pub chain_valid: bool,
}

/// Append-only sequence of [`AuditRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct AuditJournal {
    records: Vec<AuditRecord>,
}

impl AuditJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal a staged event onto the end of the chain.
    pub(crate) fn seal(&mut self, staged: StagedEvent) -> &AuditRecord {
        let sequence = self.records.len() as u64;
        let previous_digest = self.head();
        let digest = sha256_chained(&previous_digest, sequence, &staged.payload);
        tracing::debug!(
            sequence,
            event = staged.event.name(),
            digest = %digest,
            "audit record sealed"
        );
        self.records.push(AuditRecord {
            sequence,
            event: staged.event,
            recorded_at: staged.recorded_at,
            previous_digest,
            digest,
        });
        &self.records[self.records.len() - 1]
    }

    /// Digest of the last record, or zero for an empty journal.
    pub fn head(&self) -> ContentDigest {
        self.records
            .last()
            .map(|r| r.digest)
            .unwrap_or(ContentDigest::ZERO)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records with `sequence >= since`.
    pub fn since(&self, since: u64) -> &[AuditRecord] {
        let start = usize::try_from(since)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    /// Recompute every link and digest.
    pub fn verify(&self) -> ChainIntegrity {
        verify_records(&self.records)
    }
}

/// Verify an arbitrary slice of records, e.g. one fetched from an observer.
pub fn verify_records(records: &[AuditRecord]) -> ChainIntegrity {
    let mut broken_links = Vec::new();
    let mut expected_previous = ContentDigest::ZERO;

    for (index, record) in records.iter().enumerate() {
        let sequence = index as u64;
        let recomputed = CanonicalBytes::new(&DigestInput {
            event: &record.event,
            recorded_at: &record.recorded_at,
        })
        .map(|payload| sha256_chained(&record.previous_digest, sequence, &payload));

        let intact = record.sequence == sequence
            && record.previous_digest == expected_previous
            && recomputed.as_ref().map_or(false, |d| *d == record.digest);
        if !intact {
            broken_links.push(sequence);
        }
        expected_previous = record.digest;
    }

    ChainIntegrity {
        total_events: records.len() as u64,
        chain_valid: broken_links.is_empty(),
        broken_links,
    }
}
