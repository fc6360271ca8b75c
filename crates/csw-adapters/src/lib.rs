//! # csw-adapters — Collaborator Adapters
//!
//! Concrete implementations of the `csw-validation` ports:
//!
//! - [`store::Store`]: keyed in-memory storage shared by cloning.
//! - [`InMemoryTransactionStore`] and the master-data registries in
//!   [`memory`], bundled as [`MemoryBackend`].
//! - Notifiers: [`RecordingNotifier`], [`TracingNotifier`], and the
//!   `reqwest`-based [`HttpWebhookNotifier`].

pub mod memory;
pub mod notify;
pub mod store;
pub mod transactions;
pub mod webhook;

pub use memory::{
    InMemoryCustomerStore, InMemoryLicenceStore, InMemoryProductRegistry,
    InMemorySubstanceRegistry, InMemoryThresholdStore, MemoryBackend,
};
pub use notify::{RecordingNotifier, TracingNotifier};
pub use store::Store;
pub use transactions::InMemoryTransactionStore;
pub use webhook::{HttpWebhookNotifier, EVENT_HEADER};
