//! # csw-state — Override Decision State Machine
//!
//! The only lifecycle the validation engine owns is the override decision
//! attached to a failed transaction. Licence, customer and substance
//! lifecycles belong to the master-data systems and reach the engine as
//! plain status values.
//!
//! - **Override decision** (`decision.rs`): `None → Pending → Approved | Rejected`,
//!   one-shot decisions, full reset on re-validation, ordered transition log.

pub mod decision;

pub use decision::{
    OverrideDecision, OverrideEvidence, OverrideStateError, OverrideStatus,
    OverrideTransitionRecord,
};
