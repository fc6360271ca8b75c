//! # csw-validation — Transaction Compliance Validation Engine
//!
//! Decides, for every proposed transaction (order, shipment, return,
//! transfer), whether it may proceed, is blocked, or must wait for a human
//! override decision.
//!
//! ## Components
//!
//! - **Customer qualification** (`qualification.rs`): existence,
//!   suspension, approval, GDP status.
//! - **Licence coverage** (`coverage.rs`): best-fit licence per line
//!   against required activities and the licence-type strategy table
//!   (`activities.rs` derives the activities).
//! - **Thresholds** (`threshold.rs`, `period.rs`): quantity, cumulative
//!   and frequency limits over calendar windows.
//! - **Cross-border permits** (`cross_border.rs`).
//! - **Orchestrator** (`orchestrator.rs`): runs all checks, persists,
//!   notifies.
//! - **Override workflow** (`override_workflow.rs`).
//!
//! ## Ambient
//!
//! Collaborator ports (`ports.rs`), notifier capability (`notifier.rs`),
//! per-customer usage locks (`lock.rs`), configuration (`config.rs`) and
//! tracing setup (`telemetry.rs`).
//!
//! ## Crate Policy
//!
//! - Every collaborator is reached through an `async_trait` port.
//! - All quantities are `rust_decimal::Decimal`.
//! - Caller context is passed explicitly as [`csw_core::ValidationContext`].

pub mod activities;
pub mod config;
pub mod coverage;
pub mod cross_border;
pub mod error;
pub mod lock;
pub mod notifier;
pub mod orchestrator;
pub mod override_workflow;
pub mod period;
pub mod ports;
pub mod qualification;
pub mod telemetry;
pub mod threshold;
pub mod transaction;

pub use activities::RequiredActivityTable;
pub use config::{ConfigError, EngineConfig, LogConfig, WebhookConfig};
pub use coverage::{CoverageMatch, LicenceCoverageMatcher, LineSubstance, ResolvedLine};
pub use cross_border::CrossBorderPermitChecker;
pub use error::{OverrideError, StoreError, ValidationError};
pub use lock::{KeyedLocks, UsageLockRegistry};
pub use notifier::{
    dispatch_best_effort, event_types, NoopNotifier, NotificationEvent, NotifyError,
    WebhookNotifier,
};
pub use orchestrator::{requires_override, ValidationEngine};
pub use override_workflow::OverrideWorkflow;
pub use period::PeriodWindow;
pub use ports::{
    Collaborators, CustomerStore, LicenceStore, ProductRegistry, SubstanceRegistry,
    ThresholdStore, TransactionStore,
};
pub use qualification::CustomerQualificationChecker;
pub use telemetry::{init_tracing, TelemetryError};
pub use threshold::{Measure, ThresholdEvaluator};
pub use transaction::{
    ThresholdDetail, Transaction, TransactionLicenceUsage, TransactionLine, TransactionViolation,
    ValidationOutcome, ViolationCode,
};
