//! # In-Memory Transaction Store
//!
//! Validation records (violations and licence usages) live on the stored
//! transaction but are written only through their own operations:
//! [`TransactionStore::update`] keeps whatever records are already stored.

use async_trait::async_trait;
use chrono::NaiveDate;

use csw_core::{CustomerRef, SubstanceCode, TransactionId};
use csw_validation::{
    StoreError, Transaction, TransactionLicenceUsage, TransactionStore, TransactionViolation,
};

use crate::store::Store;

/// [`TransactionStore`] over a [`Store`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    records: Store<TransactionId, Transaction>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record wholesale, validation records included.
    pub fn seed(&self, transaction: Transaction) {
        self.records.insert(transaction.id, transaction);
    }

    /// Every stored transaction.
    pub fn all(&self) -> Vec<Transaction> {
        self.records.filter(|_| true)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn not_found(id: TransactionId) -> StoreError {
        StoreError::NotFound {
            kind: "transaction",
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.records.get(&id))
    }

    async fn get_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self.records.find(|t| t.external_id == external_id))
    }

    async fn create(&self, transaction: &Transaction) -> Result<(), StoreError> {
        if self.records.insert_new(transaction.id, transaction.clone()) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!(
                "transaction {} already exists",
                transaction.id
            )))
        }
    }

    async fn update(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.records
            .update(&transaction.id, |stored| {
                let violations = std::mem::take(&mut stored.violations);
                let usages = std::mem::take(&mut stored.licence_usages);
                *stored = transaction.clone();
                stored.violations = violations;
                stored.licence_usages = usages;
            })
            .ok_or_else(|| Self::not_found(transaction.id))
    }

    async fn get_in_period(
        &self,
        customer: &CustomerRef,
        substance: Option<&SubstanceCode>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut found = self.records.filter(|t| {
            &t.customer == customer
                && t.transaction_date >= from
                && t.transaction_date <= to
                && t.may_proceed()
                && substance.map_or(true, |s| t.contains_substance(s))
        });
        found.sort_by(|a, b| {
            a.transaction_date
                .cmp(&b.transaction_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn add_violations(
        &self,
        id: TransactionId,
        violations: &[TransactionViolation],
    ) -> Result<(), StoreError> {
        self.records
            .update(&id, |t| t.violations.extend_from_slice(violations))
            .ok_or_else(|| Self::not_found(id))
    }

    async fn clear_violations(&self, id: TransactionId) -> Result<(), StoreError> {
        self.records
            .update(&id, |t| {
                t.violations.clear();
                t.licence_usages.clear();
            })
            .ok_or_else(|| Self::not_found(id))
    }

    async fn add_licence_usage(
        &self,
        id: TransactionId,
        usages: &[TransactionLicenceUsage],
    ) -> Result<(), StoreError> {
        self.records
            .update(&id, |t| t.licence_usages.extend_from_slice(usages))
            .ok_or_else(|| Self::not_found(id))
    }

    async fn get_pending_overrides(&self) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.records.filter(|t| t.override_decision.is_pending()))
    }
}
