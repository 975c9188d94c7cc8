//! # Ledger Facade
//!
//! [`Ledger`] owns the committed store, the audit journal, and the payout
//! transport, and exposes one method per entry point.
//!
//! Every mutating method runs through [`Ledger::transact`]: the body mutates
//! the store through a transaction that logs each entry it touches, and
//! only a successful body keeps its changes and has its staged events
//! sealed. A failed body is rolled back from the log.
//!
//! Read methods are pure projections of committed state and are answered
//! even while the ledger is paused.

use std::sync::Arc;

use parking_lot::Mutex;
use surety_core::{AccountId, Amount, FlightKey};

use crate::audit::AuditJournal;
use crate::claims::{self, CreditSummary};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::escrow::{self, FlightStatus, Passenger, PurchaseReceipt};
use crate::guard;
use crate::registry::{self, Airline};
use crate::store::LedgerStore;
use crate::transaction::{self, Transaction};
use crate::transport::{PayoutJournal, PayoutReceipt, PayoutTransport};

/// The consortium ledger.
#[derive(Debug)]
pub struct Ledger<T = PayoutJournal> {
    store: LedgerStore,
    journal: AuditJournal,
    transport: T,
}

impl<T: PayoutTransport> Ledger<T> {
    pub fn new(config: LedgerConfig, transport: T) -> Self {
        tracing::info!(
            owner = %config.owner,
            founding_threshold = config.founding_threshold,
            membership_fee = %config.membership_fee,
            "ledger initialized"
        );
        Self {
            store: LedgerStore::new(&config),
            journal: AuditJournal::new(),
            transport,
        }
    }

    /// Run `body` atomically.
    fn transact<R>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&mut Transaction<'_>, &mut T) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let transport = &mut self.transport;
        match transaction::atomically(&mut self.store, |tx| body(tx, transport)) {
            Ok((out, staged)) => {
                let events = staged.len();
                for event in staged {
                    self.journal.seal(event);
                }
                tracing::info!(operation, events, "ledger call committed");
                Ok(out)
            }
            Err(err) => {
                tracing::warn!(operation, kind = err.kind(), error = %err, "ledger call rejected");
                Err(err)
            }
        }
    }

    // ── Access guard ────────────────────────────────────────────────

    pub fn is_operational(&self) -> bool {
        guard::is_operational(&self.store)
    }

    pub fn set_operating_status(&mut self, caller: &AccountId, mode: bool) -> Result<(), LedgerError> {
        self.transact("set_operating_status", |tx, _| {
            guard::set_operating_status(tx, caller, mode)
        })
    }

    pub fn is_active(&self, id: &AccountId) -> bool {
        guard::is_active(&self.store, id)
    }

    // ── Airline registry ────────────────────────────────────────────

    pub fn register_airline(
        &mut self,
        name: &str,
        airline: AccountId,
        requestor: AccountId,
    ) -> Result<Airline, LedgerError> {
        self.transact("register_airline", |tx, _| {
            registry::register_airline(tx, name, airline, requestor)
        })
    }

    pub fn fund_airline(&mut self, airline: AccountId, attached: Amount) -> Result<Airline, LedgerError> {
        self.transact("fund_airline", |tx, _| {
            registry::fund_airline(tx, airline, attached)
        })
    }

    pub fn approve_airline(
        &mut self,
        candidate: AccountId,
        requestor: AccountId,
    ) -> Result<Airline, LedgerError> {
        self.transact("approve_airline", |tx, _| {
            registry::approve_airline(tx, candidate, requestor)
        })
    }

    pub fn fetch_airline_status(&self, id: &AccountId) -> Airline {
        registry::fetch_airline_status(&self.store, id)
    }

    /// Votes a registration made now would require.
    pub fn required_votes(&self) -> u64 {
        registry::required_votes(
            self.store.total_registered_airlines(),
            self.store.founding_threshold(),
        )
    }

    pub fn total_registered_airlines(&self) -> u64 {
        self.store.total_registered_airlines()
    }

    // ── Insurance escrow ────────────────────────────────────────────

    pub fn buy(
        &mut self,
        passenger: AccountId,
        flight: &FlightKey,
        attached: Amount,
    ) -> Result<PurchaseReceipt, LedgerError> {
        self.transact("buy", |tx, _| escrow::buy(tx, passenger, flight, attached))
    }

    pub fn passenger_status(&self, id: &AccountId) -> Passenger {
        escrow::passenger_status(&self.store, id)
    }

    pub fn flight_status(&self, flight: &FlightKey) -> Option<FlightStatus> {
        escrow::flight_status(&self.store, flight)
    }

    // ── Claims settlement ───────────────────────────────────────────

    pub fn credit_insurees(&mut self, flight: &FlightKey) -> Result<CreditSummary, LedgerError> {
        self.transact("credit_insurees", |tx, _| claims::credit_insurees(tx, flight))
    }

    pub fn pay(&mut self, recipient: AccountId) -> Result<PayoutReceipt, LedgerError> {
        self.transact("pay", |tx, transport| claims::pay(tx, transport, recipient))
    }

    // ── Ledger-wide ─────────────────────────────────────────────────

    pub fn contract_balance(&self) -> Amount {
        self.store.contract_balance()
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn audit(&self) -> &AuditJournal {
        &self.journal
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

// ─── Shared handle ───────────────────────────────────────────────────

/// Cloneable handle that serializes every call through one mutex.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug)]
pub struct SharedLedger<T = PayoutJournal> {
    inner: Arc<Mutex<Ledger<T>>>,
}

impl<T> Clone for SharedLedger<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: PayoutTransport> SharedLedger<T> {
    pub fn new(ledger: Ledger<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger<T>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Run a read-only `f` against committed state.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger<T>) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::LedgerEvent;
    use crate::registry::AirlineState;
    use crate::transport::TransportError;

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 20])
    }

    const OWNER: u8 = 0xAA;

    fn ledger() -> Ledger {
        Ledger::new(
            LedgerConfig::new(account(OWNER)).with_membership_fee(Amount::new(10)),
            PayoutJournal::new(),
        )
    }

    #[derive(Debug, Default)]
    struct FlakyRail {
        fail: bool,
        sent: Vec<(AccountId, Amount)>,
    }

    impl PayoutTransport for FlakyRail {
        fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<PayoutReceipt, TransportError> {
            if self.fail {
                return Err(TransportError::Unavailable("rail offline".to_string()));
            }
            self.sent.push((*to, amount));
            PayoutJournal::new().transfer(to, amount)
        }
    }

    #[test]
    fn pause_blocks_mutations_but_not_reads() {
        let mut l = ledger();
        l.register_airline("First", account(1), account(1)).unwrap();
        l.set_operating_status(&account(OWNER), false).unwrap();
        assert!(!l.is_operational());

        assert!(matches!(
            l.fund_airline(account(1), Amount::new(10)),
            Err(LedgerError::NotOperational)
        ));
        assert_eq!(l.fetch_airline_status(&account(1)).name, "First");
        assert_eq!(l.total_registered_airlines(), 1);

        l.set_operating_status(&account(OWNER), true).unwrap();
        l.fund_airline(account(1), Amount::new(10)).unwrap();
        assert!(l.is_active(&account(1)));
    }

    #[test]
    fn only_owner_toggles_status() {
        let mut l = ledger();
        assert!(matches!(
            l.set_operating_status(&account(1), false),
            Err(LedgerError::NotOwner { .. })
        ));
        assert!(l.is_operational());
        assert!(l.audit().is_empty());
    }

    #[test]
    fn rejected_call_stages_no_events() {
        let mut l = ledger();
        l.register_airline("First", account(1), account(1)).unwrap();
        assert_eq!(l.audit().len(), 1);
        assert!(l.approve_airline(account(1), account(1)).is_err());
        assert_eq!(l.audit().len(), 1);
    }

    #[test]
    fn failed_transfer_rolls_back_everything() {
        let mut l = Ledger::new(LedgerConfig::new(account(OWNER)), FlakyRail::default());
        let flight = FlightKey::new("FL1").unwrap();
        l.buy(account(1), &flight, Amount::new(3)).unwrap();
        let events_before = l.audit().len();

        l.transport.fail = true;
        let err = l.pay(account(1)).unwrap_err();
        assert!(matches!(err, LedgerError::TransferFailed { .. }));
        assert_eq!(l.passenger_status(&account(1)).balance, Amount::new(3));
        assert_eq!(l.contract_balance(), Amount::new(3));
        assert_eq!(l.audit().len(), events_before);

        l.transport.fail = false;
        let receipt = l.pay(account(1)).unwrap();
        assert_eq!(receipt.amount, Amount::new(3));
        assert_eq!(l.transport().sent, vec![(account(1), Amount::new(3))]);
        assert_eq!(l.passenger_status(&account(1)).balance, Amount::ZERO);
    }

    #[test]
    fn failed_pay_restores_only_what_it_touched() {
        let mut l = Ledger::new(LedgerConfig::new(account(OWNER)), FlakyRail::default());
        let flight = FlightKey::new("FL1").unwrap();
        l.buy(account(1), &flight, Amount::new(3)).unwrap();
        l.buy(account(2), &flight, Amount::new(5)).unwrap();
        let pool_before = l.flight_status(&flight);
        let other_before = l.passenger_status(&account(2));

        l.transport.fail = true;
        assert!(l.pay(account(1)).is_err());
        assert!(l.pay(account(7)).is_err());

        assert_eq!(l.passenger_status(&account(1)).balance, Amount::new(3));
        assert_eq!(l.passenger_status(&account(2)), other_before);
        assert!(l.store().passenger(&account(7)).is_none());
        assert_eq!(l.flight_status(&flight), pool_before);
        assert_eq!(l.contract_balance(), Amount::new(8));
    }

    #[test]
    fn committed_calls_extend_a_valid_chain() {
        let mut l = ledger();
        let flight = FlightKey::new("FL1").unwrap();
        l.register_airline("First", account(1), account(1)).unwrap();
        l.fund_airline(account(1), Amount::new(10)).unwrap();
        l.buy(account(2), &flight, Amount::new(1)).unwrap();
        l.credit_insurees(&flight).unwrap();
        l.pay(account(2)).unwrap();

        let names: Vec<&str> = l.audit().records().iter().map(|r| r.event.name()).collect();
        assert_eq!(
            names,
            vec![
                "airline_registered",
                "airline_funded",
                "insurance_purchased",
                "insuree_credited",
                "payout_withdrawn",
            ]
        );
        assert!(l.audit().verify().chain_valid);
    }

    #[test]
    fn required_votes_tracks_counter() {
        let mut l = ledger();
        assert_eq!(l.required_votes(), 0);
        let mut requestor = account(1);
        for i in 1..=4u8 {
            l.register_airline("Founder", account(i), requestor).unwrap();
            l.fund_airline(account(i), Amount::new(10)).unwrap();
            requestor = account(i);
        }
        assert_eq!(l.required_votes(), 2);
        let fifth = l.register_airline("Fifth", account(5), account(2)).unwrap();
        assert_eq!(fifth.state, AirlineState::PendingApproval);
        assert!(matches!(
            l.audit().records().last().map(|r| &r.event),
            Some(LedgerEvent::AirlineRegistered { min_required_votes: 2, .. })
        ));
    }

    #[test]
    fn shared_handle_serializes_writers() {
        let shared = SharedLedger::new(ledger());
        let flight = FlightKey::new("FL1").unwrap();
        let handles: Vec<_> = (1..=8u8)
            .map(|i| {
                let shared = shared.clone();
                let flight = flight.clone();
                std::thread::spawn(move || {
                    shared.with(|l| l.buy(account(i), &flight, Amount::new(1)).unwrap());
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        shared.read(|l| {
            assert_eq!(l.flight_status(&flight).unwrap().participant_count, 8);
            assert_eq!(l.contract_balance(), Amount::new(8));
            assert!(l.audit().verify().chain_valid);
        });
    }
}
