//! # Collaborator Ports
//!
//! The engine reaches persistence and master data exclusively through
//! these traits. Each is `Send + Sync` and shared as `Arc<dyn _>`, so
//! in-memory, database and remote-registry backends are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use csw_core::{CustomerRef, HolderId, HolderType, ItemRef, SubstanceCode, TransactionId};
use csw_pack::{BusinessCategory, Customer, Licence, Substance, Threshold};

use crate::error::StoreError;
use crate::notifier::{NoopNotifier, WebhookNotifier};
use crate::transaction::{Transaction, TransactionLicenceUsage, TransactionViolation};

/// Transactions and their validation records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    // ── Records ──

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;
    async fn get_by_external_id(&self, external_id: &str)
        -> Result<Option<Transaction>, StoreError>;
    async fn create(&self, transaction: &Transaction) -> Result<(), StoreError>;

    /// Write header fields, lines and override decision. Violations and
    /// licence usages are written through their own operations.
    async fn update(&self, transaction: &Transaction) -> Result<(), StoreError>;

    // ── History ──

    /// Transactions of `customer` dated within `[from, to]` that reached a
    /// non-blocked state (passed, or override approved). With `substance`
    /// set, only transactions carrying that substance on some line.
    async fn get_in_period(
        &self,
        customer: &CustomerRef,
        substance: Option<&SubstanceCode>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, StoreError>;

    // ── Validation records ──

    async fn add_violations(
        &self,
        id: TransactionId,
        violations: &[TransactionViolation],
    ) -> Result<(), StoreError>;

    /// Remove prior violations and licence-usage records.
    async fn clear_violations(&self, id: TransactionId) -> Result<(), StoreError>;

    async fn add_licence_usage(
        &self,
        id: TransactionId,
        usages: &[TransactionLicenceUsage],
    ) -> Result<(), StoreError>;

    // ── Override queue ──

    /// Transactions whose override decision is pending, in any order.
    async fn get_pending_overrides(&self) -> Result<Vec<Transaction>, StoreError>;
}

/// Configured thresholds.
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// Candidate thresholds for the given substances and customer: global
    /// thresholds, thresholds of any listed substance, and thresholds
    /// narrowed to this customer or category. The engine ranks them.
    async fn get_applicable(
        &self,
        substance_codes: &[SubstanceCode],
        customer: &CustomerRef,
        category: Option<BusinessCategory>,
    ) -> Result<Vec<Threshold>, StoreError>;
}

/// Licence registry.
#[async_trait]
pub trait LicenceStore: Send + Sync {
    async fn get_by_holder(
        &self,
        holder_id: &HolderId,
        holder_type: HolderType,
    ) -> Result<Vec<Licence>, StoreError>;
}

/// Customer master.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_by_account(
        &self,
        account: &str,
        data_area_id: &str,
    ) -> Result<Option<Customer>, StoreError>;
}

/// Substance registry.
#[async_trait]
pub trait SubstanceRegistry: Send + Sync {
    async fn get_by_substance_code(
        &self,
        code: &SubstanceCode,
    ) -> Result<Option<Substance>, StoreError>;
}

/// Product master; maps items to controlled substances.
#[async_trait]
pub trait ProductRegistry: Send + Sync {
    /// `None` when the item is not a controlled product.
    async fn resolve_substance_code(
        &self,
        item: &ItemRef,
    ) -> Result<Option<SubstanceCode>, StoreError>;
}

/// The full set of collaborators an engine runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub transactions: Arc<dyn TransactionStore>,
    pub thresholds: Arc<dyn ThresholdStore>,
    pub licences: Arc<dyn LicenceStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub substances: Arc<dyn SubstanceRegistry>,
    pub products: Arc<dyn ProductRegistry>,
    pub notifier: Arc<dyn WebhookNotifier>,
}

impl Collaborators {
    /// Bundle the stores with a no-op notifier.
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        thresholds: Arc<dyn ThresholdStore>,
        licences: Arc<dyn LicenceStore>,
        customers: Arc<dyn CustomerStore>,
        substances: Arc<dyn SubstanceRegistry>,
        products: Arc<dyn ProductRegistry>,
    ) -> Self {
        Self {
            transactions,
            thresholds,
            licences,
            customers,
            substances,
            products,
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn WebhookNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
