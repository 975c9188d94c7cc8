//! # Access Guard
//!
//! The three gates every other component passes through:
//!
//! - **operational**: a pause switch only the owner can flip,
//! - **owner**: identity equality against the configured owner,
//! - **active member**: registered *and* funded, with a bootstrap escape
//!   while no airline has been counted yet.

use surety_core::AccountId;

use crate::audit::LedgerEvent;
use crate::error::LedgerError;
use crate::store::LedgerStore;
use crate::transaction::Transaction;

pub fn is_operational(store: &LedgerStore) -> bool {
    store.operational
}

/// Registered and funded.
pub fn is_active(store: &LedgerStore, id: &AccountId) -> bool {
    store.airline(id).is_some_and(|a| a.is_active())
}

pub(crate) fn require_operational(store: &LedgerStore) -> Result<(), LedgerError> {
    if store.operational {
        Ok(())
    } else {
        Err(LedgerError::NotOperational)
    }
}

pub(crate) fn require_owner(store: &LedgerStore, caller: &AccountId) -> Result<(), LedgerError> {
    if store.owner == *caller {
        Ok(())
    } else {
        Err(LedgerError::NotOwner { caller: *caller })
    }
}

/// Passes if `id` is active, or if no airline has been counted yet.
pub(crate) fn require_active(store: &LedgerStore, id: &AccountId) -> Result<(), LedgerError> {
    if store.total_registered_airlines == 0 || is_active(store, id) {
        Ok(())
    } else {
        Err(LedgerError::NotActiveMember { account: *id })
    }
}

/// Owner-only. Runs regardless of the operational flag.
pub(crate) fn set_operating_status(
    tx: &mut Transaction,
    caller: &AccountId,
    mode: bool,
) -> Result<(), LedgerError> {
    require_owner(tx.store(), caller)?;
    tx.set_operational(mode);
    tx.emit(LedgerEvent::OperationalStatusChanged { mode })
}
