//! # Claims Settlement
//!
//! Crediting insurees of a delayed flight and paying passengers out.
//!
//! ## Settlement rules
//!
//! `credit_insurees` walks the flight's current participants in purchase
//! order. For each one it zeroes the premium recorded on the flight,
//! releases that premium from the passenger's `balance`, and multiplies
//! the passenger's *existing* `withdrawable_balance` by 3/2 (rounding
//! down). The release stops at zero: a passenger already paid out keeps a
//! zero `balance` and the rest of the batch still settles. A passenger holding two slots is multiplied twice. The flight's
//! cursor is rewound to zero afterwards.
//!
//! `pay` disburses the passenger's `balance`, not `withdrawable_balance`,
//! and zeroes it. The transfer is the final step; a refused transfer undoes
//! the whole call.

use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount, FlightKey};

use crate::audit::LedgerEvent;
use crate::error::LedgerError;
use crate::guard;
use crate::transaction::Transaction;
use crate::transport::{PayoutReceipt, PayoutTransport};

/// Payout multiplier applied to the withdrawable balance on credit.
pub const CREDIT_MULTIPLIER: (u128, u128) = (3, 2);

/// One participant's settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsureeCredit {
    pub passenger: AccountId,
    /// Premium released from the flight.
    pub premium: Amount,
    pub balance: Amount,
    pub withdrawable_balance: Amount,
}

/// Outcome of crediting a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditSummary {
    pub flight: FlightKey,
    /// Participant count of the batch before the cursor was rewound.
    pub participant_count: u64,
    pub credits: Vec<InsureeCredit>,
}

pub(crate) fn credit_insurees(
    tx: &mut Transaction,
    flight: &FlightKey,
) -> Result<CreditSummary, LedgerError> {
    guard::require_operational(tx.store())?;

    let Some(pool) = tx.flight_mut(flight) else {
        return Ok(CreditSummary {
            flight: flight.clone(),
            participant_count: 0,
            credits: Vec::new(),
        });
    };

    let batch: Vec<(AccountId, Amount)> = pool
        .participants()
        .to_vec()
        .into_iter()
        .map(|passenger| (passenger, pool.take_paid(&passenger)))
        .collect();
    pool.reset_count();
    let participant_count = batch.len() as u64;
    let mut credits = Vec::with_capacity(batch.len());

    for (passenger, premium) in batch {
        let account = tx.passenger_entry(passenger);
        let released = premium.min(account.balance);
        account.balance = account.balance.checked_sub(released)?;
        let (num, den) = CREDIT_MULTIPLIER;
        account.withdrawable_balance = account.withdrawable_balance.scale(num, den)?;
        if released < premium {
            tracing::debug!(
                passenger = %passenger,
                flight = %flight,
                premium = %premium,
                released = %released,
                "premium exceeded remaining balance"
            );
        }
        credits.push(InsureeCredit {
            passenger,
            premium,
            balance: account.balance,
            withdrawable_balance: account.withdrawable_balance,
        });
    }

    for credit in &credits {
        tx.emit(LedgerEvent::InsureeCredited {
            passenger: credit.passenger,
            flight: flight.clone(),
            withdrawable_balance: credit.withdrawable_balance,
            balance: credit.balance,
            participant_count,
        })?;
    }

    Ok(CreditSummary {
        flight: flight.clone(),
        participant_count,
        credits,
    })
}

pub(crate) fn pay<T: PayoutTransport + ?Sized>(
    tx: &mut Transaction,
    transport: &mut T,
    recipient: AccountId,
) -> Result<PayoutReceipt, LedgerError> {
    guard::require_operational(tx.store())?;

    let amount = match tx.passenger_mut(&recipient) {
        Some(account) => std::mem::take(&mut account.balance),
        None => Amount::ZERO,
    };
    tx.withdraw(amount)?;

    tx.emit(LedgerEvent::PayoutWithdrawn {
        recipient,
        amount,
        balance: Amount::ZERO,
    })?;

    transport
        .transfer(&recipient, amount)
        .map_err(|e| LedgerError::TransferFailed {
            recipient,
            amount,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::escrow::{self, passenger_status};
    use crate::store::LedgerStore;
    use crate::transport::{PayoutJournal, TransportError};

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 20])
    }

    fn fl(s: &str) -> FlightKey {
        FlightKey::new(s).unwrap()
    }

    fn store() -> LedgerStore {
        LedgerStore::new(&LedgerConfig::new(account(0xAA)))
    }

    fn run<R>(
        store: &mut LedgerStore,
        f: impl FnOnce(&mut Transaction) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        crate::transaction::atomically(store, f).map(|(out, _)| out)
    }

    struct Refusing;

    impl PayoutTransport for Refusing {
        fn transfer(&mut self, recipient: &AccountId, _: Amount) -> Result<PayoutReceipt, TransportError> {
            Err(TransportError::Rejected {
                recipient: *recipient,
                reason: "account closed".to_string(),
            })
        }
    }

    #[test]
    fn credit_zeroes_premiums_and_rewinds_cursor() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(4))).unwrap();
        run(&mut s, |tx| escrow::buy(tx, account(2), &fl("FL1"), Amount::new(6))).unwrap();

        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("FL1"))).unwrap();
        assert_eq!(summary.participant_count, 2);
        assert_eq!(summary.credits[0].premium, Amount::new(4));
        assert_eq!(summary.credits[1].premium, Amount::new(6));

        let pool = s.flight(&fl("FL1")).unwrap();
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.paid_by(&account(1)), Amount::ZERO);
        assert_eq!(pool.paid_by(&account(2)), Amount::ZERO);
        assert_eq!(passenger_status(&s, &account(1)).balance, Amount::ZERO);
        assert_eq!(passenger_status(&s, &account(2)).balance, Amount::ZERO);
    }

    #[test]
    fn credit_scales_existing_withdrawable_balance() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(10))).unwrap();
        s.passengers.get_mut(&account(1)).unwrap().withdrawable_balance = Amount::new(10);

        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("FL1"))).unwrap();
        assert_eq!(summary.credits[0].withdrawable_balance, Amount::new(15));
        // A fresh passenger has nothing withdrawable, and 0 * 3/2 stays 0.
        run(&mut s, |tx| escrow::buy(tx, account(2), &fl("FL2"), Amount::new(10))).unwrap();
        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("FL2"))).unwrap();
        assert_eq!(summary.credits[0].withdrawable_balance, Amount::ZERO);
    }

    #[test]
    fn duplicate_participant_is_scaled_twice() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(1))).unwrap();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(2))).unwrap();
        s.passengers.get_mut(&account(1)).unwrap().withdrawable_balance = Amount::new(4);

        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("FL1"))).unwrap();
        assert_eq!(summary.credits.len(), 2);
        assert_eq!(summary.credits[0].premium, Amount::new(3));
        assert_eq!(summary.credits[1].premium, Amount::ZERO);
        assert_eq!(passenger_status(&s, &account(1)).withdrawable_balance, Amount::new(9));
    }

    #[test]
    fn pay_then_credit_settles_the_whole_flight() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(3))).unwrap();
        run(&mut s, |tx| escrow::buy(tx, account(2), &fl("FL1"), Amount::new(5))).unwrap();
        let mut journal = PayoutJournal::new();
        run(&mut s, |tx| pay(tx, &mut journal, account(1))).unwrap();

        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("FL1"))).unwrap();
        assert_eq!(summary.credits.len(), 2);
        assert_eq!(summary.credits[0].premium, Amount::new(3));
        assert_eq!(summary.credits[0].balance, Amount::ZERO);
        assert_eq!(summary.credits[1].balance, Amount::ZERO);
        assert_eq!(s.flight(&fl("FL1")).unwrap().count(), 0);
        assert_eq!(passenger_status(&s, &account(2)).balance, Amount::ZERO);

        let again = run(&mut s, |tx| credit_insurees(tx, &fl("FL1"))).unwrap();
        assert!(again.credits.is_empty());
    }

    #[test]
    fn credit_unknown_flight_is_a_no_op() {
        let mut s = store();
        let summary = run(&mut s, |tx| credit_insurees(tx, &fl("NOPE"))).unwrap();
        assert!(summary.credits.is_empty());
        assert!(s.flight(&fl("NOPE")).is_none());
    }

    #[test]
    fn pay_disburses_balance_and_zeroes_it() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(3))).unwrap();
        let mut journal = PayoutJournal::new();

        let receipt = run(&mut s, |tx| pay(tx, &mut journal, account(1))).unwrap();
        assert_eq!(receipt.amount, Amount::new(3));
        assert_eq!(passenger_status(&s, &account(1)).balance, Amount::ZERO);
        assert_eq!(s.contract_balance(), Amount::ZERO);
        assert_eq!(journal.disbursements().len(), 1);
    }

    #[test]
    fn refused_transfer_surfaces_transfer_failed() {
        let mut s = store();
        run(&mut s, |tx| escrow::buy(tx, account(1), &fl("FL1"), Amount::new(3))).unwrap();

        let err = run(&mut s, |tx| pay(tx, &mut Refusing, account(1))).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::TransferFailed { amount, .. } if amount == Amount::new(3)
        ));
        assert_eq!(passenger_status(&s, &account(1)).balance, Amount::new(3));
    }

    #[test]
    fn pay_unknown_passenger_transfers_zero() {
        let mut s = store();
        let mut journal = PayoutJournal::new();
        let receipt = run(&mut s, |tx| pay(tx, &mut journal, account(8))).unwrap();
        assert_eq!(receipt.amount, Amount::ZERO);
    }
}
