//! # csw-core — Foundational Types
//!
//! Leaf crate of the controlled-substance wholesale compliance workspace.
//! Every other crate depends on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `TransactionId`, `LicenceId`,
//!    `ThresholdId`, `HolderId`, `SubstanceCode`, `CustomerRef`, `ItemRef`.
//!    No bare strings for identifiers.
//!
//! 2. **Activities are flags.** `ActivitySet` is a bit set; licence coverage
//!    is a superset test, never a string comparison.
//!
//! 3. **Direction is derived, not stored.** `TradeDirection` is computed from
//!    origin, destination and the company's home country wherever it is needed.
//!
//! 4. **Explicit context.** `ValidationContext` carries correlation id and
//!    user through every call instead of task-local state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `csw-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod activity;
pub mod context;
pub mod country;
pub mod error;
pub mod identity;
pub mod kinds;
pub mod temporal;

pub use activity::ActivitySet;
pub use context::ValidationContext;
pub use country::{CountryCode, TradeDirection};
pub use error::CswError;
pub use identity::{
    CustomerRef, HolderId, HolderType, ItemRef, LicenceId, SubstanceCode, ThresholdId,
    TransactionId,
};
pub use kinds::{Severity, TransactionType, ValidationStatus};
pub use temporal::Timestamp;
