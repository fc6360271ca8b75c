//! Required activities per transaction type.
//!
//! The base activity set of each [`TransactionType`] is table data; the
//! trade direction adds `IMPORT` and `EXPORT` on top.

use std::collections::HashMap;

use csw_core::{ActivitySet, TradeDirection, TransactionType};

/// Mapping from transaction type to the activities a covering licence must permit.
#[derive(Debug, Clone)]
pub struct RequiredActivityTable {
    base: HashMap<TransactionType, ActivitySet>,
}

impl RequiredActivityTable {
    /// The standard table: Order/Shipment → DISTRIBUTE, Return → POSSESS,
    /// Transfer → POSSESS | STORE.
    pub fn standard() -> Self {
        let mut base = HashMap::new();
        base.insert(TransactionType::Order, ActivitySet::DISTRIBUTE);
        base.insert(TransactionType::Shipment, ActivitySet::DISTRIBUTE);
        base.insert(TransactionType::Return, ActivitySet::POSSESS);
        base.insert(
            TransactionType::Transfer,
            ActivitySet::POSSESS | ActivitySet::STORE,
        );
        Self { base }
    }

    /// Replace the base activities of `transaction_type`.
    pub fn set(&mut self, transaction_type: TransactionType, activities: ActivitySet) -> &mut Self {
        self.base.insert(transaction_type, activities);
        self
    }

    /// Base activities of `transaction_type`; empty when unmapped.
    pub fn base_for(&self, transaction_type: TransactionType) -> ActivitySet {
        self.base
            .get(&transaction_type)
            .copied()
            .unwrap_or_default()
    }

    /// Activities required for a line of a transaction of this type and direction.
    pub fn required_for(
        &self,
        transaction_type: TransactionType,
        direction: TradeDirection,
    ) -> ActivitySet {
        let mut required = self.base_for(transaction_type);
        if direction.requires_import() {
            required |= ActivitySet::IMPORT;
        }
        if direction.requires_export() {
            required |= ActivitySet::EXPORT;
        }
        required
    }
}

impl Default for RequiredActivityTable {
    fn default() -> Self {
        Self::standard()
    }
}
