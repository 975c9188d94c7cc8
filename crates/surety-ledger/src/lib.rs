//! # surety-ledger: Consortium Registry and Insurance Escrow
//!
//! A single-writer state machine that admits airlines into a consortium,
//! collects membership funding and passenger premiums, and settles claims.
//!
//! ## Components
//!
//! | Module        | Responsibility                                             |
//! |---------------|------------------------------------------------------------|
//! | [`guard`]     | operational flag, owner check, active-member gate          |
//! | [`registry`]  | airline registration, funding, voting, status projection   |
//! | [`escrow`]    | per-flight premium collection and participant bookkeeping  |
//! | [`claims`]    | insuree crediting and payouts                              |
//! | [`audit`]     | hash-chained journal of committed events                   |
//! | [`transport`] | outward payout rail                                        |
//!
//! ## Call semantics
//!
//! Every entry point on [`Ledger`] is atomic. Guards run first, then the
//! owning component mutates the store through an undo log and stages audit
//! events. On failure the log is replayed and the events are dropped.
//!
//! ```
//! use surety_core::{AccountId, Amount, FlightKey};
//! use surety_ledger::{Ledger, LedgerConfig, PayoutJournal};
//!
//! let owner = AccountId::from_bytes([0xAA; 20]);
//! let airline = AccountId::from_bytes([1; 20]);
//! let passenger = AccountId::from_bytes([2; 20]);
//! let flight = FlightKey::new("ND1309").unwrap();
//!
//! let mut ledger = Ledger::new(LedgerConfig::new(owner), PayoutJournal::new());
//! ledger.register_airline("Northwind Air", airline, airline).unwrap();
//! ledger.fund_airline(airline, Amount::ether(10)).unwrap();
//! assert!(ledger.is_active(&airline));
//!
//! ledger.buy(passenger, &flight, Amount::ether(1)).unwrap();
//! assert_eq!(ledger.passenger_status(&passenger).balance, Amount::ether(1));
//! ```

pub mod audit;
pub mod claims;
pub mod config;
pub mod error;
pub mod escrow;
pub mod guard;
pub mod ledger;
pub mod registry;
pub mod store;
mod transaction;
pub mod transport;

pub use audit::{AuditJournal, AuditRecord, ChainIntegrity, LedgerEvent};
pub use claims::{CreditSummary, InsureeCredit};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use escrow::{FlightStatus, Passenger, PolicyPosition, PurchaseReceipt};
pub use ledger::{Ledger, SharedLedger};
pub use registry::{Airline, AirlineState};
pub use store::LedgerStore;
pub use transport::{PayoutJournal, PayoutReceipt, PayoutTransport, TransportError};
