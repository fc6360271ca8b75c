//! # csw-pack — Reference Data
//!
//! The master data the validation engine reads but never writes:
//!
//! - **Licences** (`licence.rs`): licences and permits, their status and
//!   expiry, and the licence-type strategy table that decides which
//!   substances a licence type covers.
//!
//! - **Substances** (`substance.rs`): Opium-Act listing and precursor
//!   classification.
//!
//! - **Customers** (`customer.rs`): approval, suspension, GDP qualification
//!   and business category.
//!
//! - **Thresholds** (`threshold.rs`): quantity, cumulative and frequency
//!   limits with their scope and override rules.
//!
//! ## Crate Policy
//!
//! - Depends only on `csw-core` internally.
//! - Plain data plus pure predicates; no I/O.

pub mod customer;
pub mod licence;
pub mod substance;
pub mod threshold;

pub use customer::{ApprovalStatus, BusinessCategory, Customer, GdpQualificationStatus};
pub use licence::{
    licence_types, Licence, LicenceStatus, LicenceTypeRegistry, LicenceTypeRule, PermitKind,
    SubstanceCoverage,
};
pub use substance::{OpiumActList, PrecursorCategory, Substance};
pub use threshold::{Threshold, ThresholdPeriod, ThresholdType};
