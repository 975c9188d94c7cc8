//! # Ledger Store
//!
//! The single explicit store every component reads and writes. It owns the
//! airline, passenger, and flight tables together with the global scalars
//! (operational flag, owner, registration counter, holdings).
//!
//! Components mutate it only through a
//! [`Transaction`](crate::transaction::Transaction), which logs the prior
//! value of every entry it touches.

use std::collections::HashMap;

use surety_core::{AccountId, Amount, FlightKey};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::escrow::{FlightInsurance, Passenger};
use crate::registry::Airline;

/// All ledger state.
#[derive(Debug)]
pub struct LedgerStore {
    pub(crate) operational: bool,
    pub(crate) owner: AccountId,
    pub(crate) founding_threshold: u64,
    pub(crate) membership_fee: Amount,
    pub(crate) total_registered_airlines: u64,
    pub(crate) contract_balance: Amount,
    pub(crate) airlines: HashMap<AccountId, Airline>,
    pub(crate) passengers: HashMap<AccountId, Passenger>,
    pub(crate) flights: HashMap<FlightKey, FlightInsurance>,
}

impl LedgerStore {
    /// An empty, operational store.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            operational: true,
            owner: config.owner,
            founding_threshold: config.founding_threshold,
            membership_fee: config.membership_fee,
            total_registered_airlines: 0,
            contract_balance: Amount::ZERO,
            airlines: HashMap::new(),
            passengers: HashMap::new(),
            flights: HashMap::new(),
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn founding_threshold(&self) -> u64 {
        self.founding_threshold
    }

    pub fn membership_fee(&self) -> Amount {
        self.membership_fee
    }

    pub fn total_registered_airlines(&self) -> u64 {
        self.total_registered_airlines
    }

    /// Everything the ledger currently holds: funding plus uncollected premiums.
    pub fn contract_balance(&self) -> Amount {
        self.contract_balance
    }

    pub fn airline(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn passenger(&self, id: &AccountId) -> Option<&Passenger> {
        self.passengers.get(id)
    }

    pub fn flight(&self, key: &FlightKey) -> Option<&FlightInsurance> {
        self.flights.get(key)
    }

    pub fn airline_count(&self) -> usize {
        self.airlines.len()
    }

    pub(crate) fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.contract_balance = self.contract_balance.checked_add(amount)?;
        Ok(())
    }

    pub(crate) fn withdraw(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.contract_balance = self.contract_balance.checked_sub(amount)?;
        Ok(())
    }
}
