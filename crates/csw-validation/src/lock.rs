//! # Usage Serialisation
//!
//! Cumulative and frequency thresholds read history, aggregate, compare
//! and then persist. Two concurrent validations for the same customer
//! could both read the same history and both pass. [`UsageLockRegistry`]
//! hands out one async mutex per customer; the orchestrator holds it for
//! the whole read-aggregate-compare-persist sequence. The override
//! workflow uses the same [`KeyedLocks`] keyed by transaction id.
//!
//! The lock is in-process only. Engines in separate processes sharing a
//! store remain eventually consistent.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use csw_core::CustomerRef;

/// One advisory async mutex per key.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

/// Per-customer usage locks.
pub type UsageLockRegistry = KeyedLocks<CustomerRef>;

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of `key`.
    pub async fn acquire(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits for.
    pub fn prune(&self) {
        self.locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
