//! # In-Memory Master Data
//!
//! Registries for thresholds, licences, customers, substances and
//! products, plus [`MemoryBackend`], which bundles them with an
//! [`InMemoryTransactionStore`] into a ready [`Collaborators`] set.

use std::sync::Arc;

use async_trait::async_trait;

use csw_core::{CustomerRef, HolderId, HolderType, ItemRef, LicenceId, SubstanceCode, ThresholdId};
use csw_pack::{BusinessCategory, Customer, Licence, Substance, Threshold};
use csw_validation::{
    Collaborators, CustomerStore, LicenceStore, ProductRegistry, StoreError, SubstanceRegistry,
    ThresholdStore,
};

use crate::store::Store;
use crate::transactions::InMemoryTransactionStore;

// ─── Thresholds ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryThresholdStore {
    thresholds: Store<ThresholdId, Threshold>,
}

impl InMemoryThresholdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, threshold: Threshold) {
        self.thresholds.insert(threshold.id, threshold);
    }

    /// Flip a threshold's active flag. Returns `false` if unknown.
    pub fn set_active(&self, id: ThresholdId, active: bool) -> bool {
        self.thresholds
            .update(&id, |t| t.is_active = active)
            .is_some()
    }
}

#[async_trait]
impl ThresholdStore for InMemoryThresholdStore {
    async fn get_applicable(
        &self,
        substance_codes: &[SubstanceCode],
        customer: &CustomerRef,
        category: Option<BusinessCategory>,
    ) -> Result<Vec<Threshold>, StoreError> {
        Ok(self.thresholds.filter(|t| {
            let substance_ok = match &t.substance_code {
                None => true,
                Some(code) => substance_codes.contains(code),
            };
            substance_ok && t.applies_to(customer, category)
        }))
    }
}

// ─── Licences ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryLicenceStore {
    licences: Store<LicenceId, Licence>,
}

impl InMemoryLicenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, licence: Licence) {
        self.licences.insert(licence.id, licence);
    }

    /// Apply `f` to a stored licence. Returns `false` if unknown.
    pub fn modify(&self, id: LicenceId, f: impl FnOnce(&mut Licence)) -> bool {
        self.licences.update(&id, f).is_some()
    }

    pub fn remove(&self, id: LicenceId) -> Option<Licence> {
        self.licences.remove(&id)
    }
}

#[async_trait]
impl LicenceStore for InMemoryLicenceStore {
    async fn get_by_holder(
        &self,
        holder_id: &HolderId,
        holder_type: HolderType,
    ) -> Result<Vec<Licence>, StoreError> {
        Ok(self
            .licences
            .filter(|l| &l.holder_id == holder_id && l.holder_type == holder_type))
    }
}

// ─── Customers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerStore {
    customers: Store<CustomerRef, Customer>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) {
        self.customers.insert(customer.customer_ref.clone(), customer);
    }

    /// Apply `f` to a stored customer. Returns `false` if unknown.
    pub fn modify(&self, customer: &CustomerRef, f: impl FnOnce(&mut Customer)) -> bool {
        self.customers.update(customer, f).is_some()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn get_by_account(
        &self,
        account: &str,
        data_area_id: &str,
    ) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.find(|c| {
            c.customer_ref.account == account && c.customer_ref.data_area_id == data_area_id
        }))
    }
}

// ─── Substances and products ─────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemorySubstanceRegistry {
    substances: Store<SubstanceCode, Substance>,
}

impl InMemorySubstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, substance: Substance) {
        self.substances.insert(substance.code.clone(), substance);
    }
}

#[async_trait]
impl SubstanceRegistry for InMemorySubstanceRegistry {
    async fn get_by_substance_code(
        &self,
        code: &SubstanceCode,
    ) -> Result<Option<Substance>, StoreError> {
        Ok(self.substances.get(code))
    }
}

/// Item-to-substance mapping. Items never registered are uncontrolled.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRegistry {
    products: Store<ItemRef, SubstanceCode>,
}

impl InMemoryProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `item` as a product containing `substance`.
    pub fn register(&self, item: ItemRef, substance: SubstanceCode) {
        self.products.insert(item, substance);
    }
}

#[async_trait]
impl ProductRegistry for InMemoryProductRegistry {
    async fn resolve_substance_code(
        &self,
        item: &ItemRef,
    ) -> Result<Option<SubstanceCode>, StoreError> {
        Ok(self.products.get(item))
    }
}

// ─── Bundle ──────────────────────────────────────────────────────────

/// One of each in-memory collaborator. Clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pub transactions: InMemoryTransactionStore,
    pub thresholds: InMemoryThresholdStore,
    pub licences: InMemoryLicenceStore,
    pub customers: InMemoryCustomerStore,
    pub substances: InMemorySubstanceRegistry,
    pub products: InMemoryProductRegistry,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborators over this backend, with a no-op notifier.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Arc::new(self.transactions.clone()),
            Arc::new(self.thresholds.clone()),
            Arc::new(self.licences.clone()),
            Arc::new(self.customers.clone()),
            Arc::new(self.substances.clone()),
            Arc::new(self.products.clone()),
        )
    }
}
