//! # API Route Modules
//!
//! - `ledger`: operational flag, contract balance, consortium counters,
//!   request metrics.
//! - `airlines`: registration, funding, approvals, status projection.
//! - `insurance`: premium purchases, claim crediting, passenger balances,
//!   payouts.
//! - `audit`: hash-chained journal paging and verification.

pub mod airlines;
pub mod audit;
pub mod insurance;
pub mod ledger;
