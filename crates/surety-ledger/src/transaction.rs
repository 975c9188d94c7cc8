//! # Call Transactions
//!
//! Each entry point mutates the committed store in place through a
//! [`Transaction`]. Before an entry is first touched its prior value (or its
//! absence) goes into an undo log, and the global scalars are snapshotted
//! at `begin`. Cost is proportional to what the call touches, not to the
//! size of the store.
//!
//! [`Transaction::commit`] discards the log and hands back the staged
//! events. Dropping an uncommitted transaction replays the log, so an early
//! `?` return or a panic in the body leaves the store as it was.

use std::collections::HashMap;
use std::hash::Hash;

use surety_core::{AccountId, Amount, FlightKey};

use crate::audit::{LedgerEvent, StagedEvent};
use crate::error::LedgerError;
use crate::escrow::{FlightInsurance, Passenger};
use crate::registry::Airline;
use crate::store::LedgerStore;

#[derive(Debug, Clone, Copy)]
struct Scalars {
    operational: bool,
    total_registered_airlines: u64,
    contract_balance: Amount,
}

impl Scalars {
    fn capture(store: &LedgerStore) -> Self {
        Self {
            operational: store.operational,
            total_registered_airlines: store.total_registered_airlines,
            contract_balance: store.contract_balance,
        }
    }

    fn restore(self, store: &mut LedgerStore) {
        store.operational = self.operational;
        store.total_registered_airlines = self.total_registered_airlines;
        store.contract_balance = self.contract_balance;
    }
}

/// Prior values of every table entry touched so far. `None` means the key
/// did not exist.
#[derive(Debug, Default)]
struct UndoLog {
    airlines: HashMap<AccountId, Option<Airline>>,
    passengers: HashMap<AccountId, Option<Passenger>>,
    flights: HashMap<FlightKey, Option<FlightInsurance>>,
}

impl UndoLog {
    fn replay(self, store: &mut LedgerStore) {
        restore(&mut store.airlines, self.airlines);
        restore(&mut store.passengers, self.passengers);
        restore(&mut store.flights, self.flights);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.airlines.len() + self.passengers.len() + self.flights.len()
    }
}

/// First touch wins; later touches of the same key keep the original value.
fn remember<K, V>(log: &mut HashMap<K, Option<V>>, live: &HashMap<K, V>, key: &K)
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    if !log.contains_key(key) {
        log.insert(key.clone(), live.get(key).cloned());
    }
}

fn restore<K: Eq + Hash, V>(live: &mut HashMap<K, V>, log: HashMap<K, Option<V>>) {
    for (key, prior) in log {
        match prior {
            Some(value) => {
                live.insert(key, value);
            }
            None => {
                live.remove(&key);
            }
        }
    }
}

/// Working state of one in-flight ledger call.
#[derive(Debug)]
pub(crate) struct Transaction<'s> {
    store: &'s mut LedgerStore,
    scalars: Scalars,
    undo: UndoLog,
    staged: Vec<StagedEvent>,
    committed: bool,
}

impl<'s> Transaction<'s> {
    pub(crate) fn begin(store: &'s mut LedgerStore) -> Self {
        Self {
            scalars: Scalars::capture(store),
            store,
            undo: UndoLog::default(),
            staged: Vec::new(),
            committed: false,
        }
    }

    pub(crate) fn store(&self) -> &LedgerStore {
        &*self.store
    }

    // ── Scalars ─────────────────────────────────────────────────────

    pub(crate) fn set_operational(&mut self, mode: bool) {
        self.store.operational = mode;
    }

    pub(crate) fn count_registration(&mut self) {
        self.store.total_registered_airlines += 1;
    }

    pub(crate) fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.store.deposit(amount)
    }

    pub(crate) fn withdraw(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.store.withdraw(amount)
    }

    // ── Tables ──────────────────────────────────────────────────────

    pub(crate) fn airline_mut(&mut self, id: &AccountId) -> Option<&mut Airline> {
        remember(&mut self.undo.airlines, &self.store.airlines, id);
        self.store.airlines.get_mut(id)
    }

    pub(crate) fn insert_airline(&mut self, id: AccountId, record: Airline) {
        remember(&mut self.undo.airlines, &self.store.airlines, &id);
        self.store.airlines.insert(id, record);
    }

    pub(crate) fn passenger_mut(&mut self, id: &AccountId) -> Option<&mut Passenger> {
        remember(&mut self.undo.passengers, &self.store.passengers, id);
        self.store.passengers.get_mut(id)
    }

    /// The passenger's account, opened empty if it does not exist.
    pub(crate) fn passenger_entry(&mut self, id: AccountId) -> &mut Passenger {
        remember(&mut self.undo.passengers, &self.store.passengers, &id);
        self.store.passengers.entry(id).or_default()
    }

    pub(crate) fn flight_mut(&mut self, key: &FlightKey) -> Option<&mut FlightInsurance> {
        remember(&mut self.undo.flights, &self.store.flights, key);
        self.store.flights.get_mut(key)
    }

    pub(crate) fn flight_entry(&mut self, key: &FlightKey) -> &mut FlightInsurance {
        remember(&mut self.undo.flights, &self.store.flights, key);
        self.store.flights.entry(key.clone()).or_default()
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Stage an audit event. Canonicalization happens here so that sealing
    /// at commit time cannot fail.
    pub(crate) fn emit(&mut self, event: LedgerEvent) -> Result<(), LedgerError> {
        self.staged.push(StagedEvent::new(event)?);
        Ok(())
    }

    /// Keep every change and return the staged events.
    pub(crate) fn commit(mut self) -> Vec<StagedEvent> {
        self.committed = true;
        std::mem::take(&mut self.staged)
    }

    fn rollback(&mut self) {
        std::mem::take(&mut self.undo).replay(&mut *self.store);
        self.scalars.restore(&mut *self.store);
        self.staged.clear();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

/// Run `body` against `store`, keeping its changes only if it succeeds.
pub(crate) fn atomically<R>(
    store: &mut LedgerStore,
    body: impl FnOnce(&mut Transaction<'_>) -> Result<R, LedgerError>,
) -> Result<(R, Vec<StagedEvent>), LedgerError> {
    let mut tx = Transaction::begin(store);
    let out = body(&mut tx)?;
    Ok((out, tx.commit()))
}
