//! # surety-core: Foundational Types for the Consortium Ledger
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! builds on:
//!
//! 1. **`AccountId`**: fixed-width, equality-comparable account token. The
//!    ledger never issues or dereferences identities; callers supply them.
//!
//! 2. **`Amount`**: unsigned base-unit quantity with checked arithmetic.
//!    Overflow and underflow surface as [`ArithmeticError`], never wrap.
//!
//! 3. **`FlightKey`**: validated flight identifier string.
//!
//! 4. **`CanonicalBytes`**: the only input accepted by [`sha256_chained`],
//!    so every audit digest flows through one serialization path.
//!
//! 5. **`Timestamp`**: UTC-only, seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `surety-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use amount::Amount;
pub use canonical::CanonicalBytes;
pub use digest::{sha256_chained, ContentDigest};
pub use error::{ArithmeticError, CanonicalizationError, ValidationError};
pub use identity::{AccountId, FlightKey, ACCOUNT_ID_LEN};
pub use temporal::Timestamp;
