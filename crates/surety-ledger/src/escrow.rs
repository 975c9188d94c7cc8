//! # Insurance Escrow
//!
//! Premium collection per flight.
//!
//! Each flight keeps a slot list of participants and a cursor (`count`).
//! A purchase writes the passenger into slot `count` and advances the
//! cursor. Crediting a flight rewinds the cursor to zero without clearing
//! the slots, so later purchases overwrite stale slots from the front.
//! Repeat purchases by the same passenger occupy one slot each.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount, FlightKey};

use crate::audit::LedgerEvent;
use crate::error::LedgerError;
use crate::guard;
use crate::store::LedgerStore;
use crate::transaction::Transaction;

// ─── Records ─────────────────────────────────────────────────────────

/// A passenger's funds held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Passenger {
    /// Premiums paid and not yet credited.
    pub balance: Amount,
    /// Funds eligible for payout after a claim credit.
    pub withdrawable_balance: Amount,
}

/// Premium bookkeeping for one flight.
#[derive(Debug, Clone, Default)]
pub struct FlightInsurance {
    slots: Vec<AccountId>,
    paid: HashMap<AccountId, Amount>,
    count: usize,
}

impl FlightInsurance {
    /// Participants in slots `0..count`, in purchase order.
    pub fn participants(&self) -> &[AccountId] {
        &self.slots[..self.count.min(self.slots.len())]
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Outstanding premium recorded for `passenger` on this flight.
    pub fn paid_by(&self, passenger: &AccountId) -> Amount {
        self.paid.get(passenger).copied().unwrap_or(Amount::ZERO)
    }

    fn record_purchase(&mut self, passenger: AccountId, premium: Amount) -> Result<(), LedgerError> {
        if self.count < self.slots.len() {
            self.slots[self.count] = passenger;
        } else {
            self.slots.push(passenger);
        }
        self.count += 1;
        let paid = self.paid.entry(passenger).or_insert(Amount::ZERO);
        *paid = paid.checked_add(premium)?;
        Ok(())
    }

    /// Zero the recorded premium for `passenger`, returning what it was.
    pub(crate) fn take_paid(&mut self, passenger: &AccountId) -> Amount {
        self.paid
            .get_mut(passenger)
            .map(std::mem::take)
            .unwrap_or(Amount::ZERO)
    }

    pub(crate) fn reset_count(&mut self) {
        self.count = 0;
    }
}

// ─── Projections ─────────────────────────────────────────────────────

/// Outcome of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub passenger: AccountId,
    pub flight: FlightKey,
    pub premium: Amount,
    pub old_balance: Amount,
    pub new_balance: Amount,
    pub participant_count: u64,
}

/// One participant's outstanding premium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyPosition {
    pub passenger: AccountId,
    pub paid: Amount,
}

/// Read-only view of a flight's current policy pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightStatus {
    pub flight: FlightKey,
    pub participant_count: u64,
    /// One entry per slot, so repeat purchasers appear once per purchase.
    pub positions: Vec<PolicyPosition>,
}

pub fn passenger_status(store: &LedgerStore, id: &AccountId) -> Passenger {
    store.passenger(id).copied().unwrap_or_default()
}

/// `None` when nobody has ever bought cover on `flight`.
pub fn flight_status(store: &LedgerStore, flight: &FlightKey) -> Option<FlightStatus> {
    let pool = store.flight(flight)?;
    Some(FlightStatus {
        flight: flight.clone(),
        participant_count: pool.count() as u64,
        positions: pool
            .participants()
            .iter()
            .map(|p| PolicyPosition {
                passenger: *p,
                paid: pool.paid_by(p),
            })
            .collect(),
    })
}

// ─── Operations ──────────────────────────────────────────────────────

pub(crate) fn buy(
    tx: &mut Transaction,
    passenger: AccountId,
    flight: &FlightKey,
    attached: Amount,
) -> Result<PurchaseReceipt, LedgerError> {
    guard::require_operational(tx.store())?;

    let account = tx.passenger_entry(passenger);
    let old_balance = account.balance;
    account.balance = old_balance.checked_add(attached)?;
    let new_balance = account.balance;

    let pool = tx.flight_entry(flight);
    pool.record_purchase(passenger, attached)?;
    let participant_count = pool.count() as u64;

    tx.deposit(attached)?;

    tracing::debug!(
        passenger = %passenger,
        flight = %flight,
        premium = %attached,
        participant_count,
        "premium collected"
    );
    tx.emit(LedgerEvent::InsurancePurchased {
        passenger,
        flight: flight.clone(),
        old_balance,
        new_balance,
        participant_count,
    })?;

    Ok(PurchaseReceipt {
        passenger,
        flight: flight.clone(),
        premium: attached,
        old_balance,
        new_balance,
        participant_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 20])
    }

    fn fl(s: &str) -> FlightKey {
        FlightKey::new(s).unwrap()
    }

    fn store() -> LedgerStore {
        LedgerStore::new(&LedgerConfig::new(account(0xAA)))
    }

    fn purchase(store: &mut LedgerStore, p: AccountId, f: &FlightKey, amount: u128) -> PurchaseReceipt {
        crate::transaction::atomically(store, |tx| buy(tx, p, f, Amount::new(amount)))
            .unwrap()
            .0
    }

    #[test]
    fn repeat_purchases_accumulate_and_each_take_a_slot() {
        let mut s = store();
        let p = account(1);
        purchase(&mut s, p, &fl("FL1"), 1);
        let receipt = purchase(&mut s, p, &fl("FL1"), 2);

        assert_eq!(receipt.old_balance, Amount::new(1));
        assert_eq!(receipt.new_balance, Amount::new(3));
        assert_eq!(receipt.participant_count, 2);
        assert_eq!(passenger_status(&s, &p).balance, Amount::new(3));

        let pool = s.flight(&fl("FL1")).unwrap();
        assert_eq!(pool.participants(), &[p, p]);
        assert_eq!(pool.paid_by(&p), Amount::new(3));
        assert_eq!(s.contract_balance(), Amount::new(3));
    }

    #[test]
    fn flights_are_independent() {
        let mut s = store();
        purchase(&mut s, account(1), &fl("FL1"), 5);
        purchase(&mut s, account(1), &fl("FL2"), 7);
        assert_eq!(s.flight(&fl("FL1")).unwrap().paid_by(&account(1)), Amount::new(5));
        assert_eq!(s.flight(&fl("FL2")).unwrap().paid_by(&account(1)), Amount::new(7));
        assert_eq!(passenger_status(&s, &account(1)).balance, Amount::new(12));
    }

    #[test]
    fn purchase_after_reset_overwrites_front_slot() {
        let mut s = store();
        purchase(&mut s, account(1), &fl("FL1"), 1);
        purchase(&mut s, account(2), &fl("FL1"), 1);
        s.flights.get_mut(&fl("FL1")).unwrap().reset_count();

        purchase(&mut s, account(3), &fl("FL1"), 1);
        let pool = s.flight(&fl("FL1")).unwrap();
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.participants(), &[account(3)]);
        assert_eq!(pool.slots, vec![account(3), account(2)]);
    }

    #[test]
    fn flight_status_projects_current_slots() {
        let mut s = store();
        assert!(flight_status(&s, &fl("FL9")).is_none());
        purchase(&mut s, account(1), &fl("FL9"), 4);
        purchase(&mut s, account(2), &fl("FL9"), 6);
        let status = flight_status(&s, &fl("FL9")).unwrap();
        assert_eq!(status.participant_count, 2);
        assert_eq!(
            status.positions,
            vec![
                PolicyPosition { passenger: account(1), paid: Amount::new(4) },
                PolicyPosition { passenger: account(2), paid: Amount::new(6) },
            ]
        );
    }

    #[test]
    fn paused_ledger_rejects_purchase() {
        let mut s = store();
        s.operational = false;
        let mut tx = Transaction::begin(&mut s);
        assert!(matches!(
            buy(&mut tx, account(1), &fl("FL1"), Amount::new(1)),
            Err(LedgerError::NotOperational)
        ));
    }

    #[test]
    fn unknown_passenger_projects_to_zero() {
        assert_eq!(passenger_status(&store(), &account(5)), Passenger::default());
    }
}
