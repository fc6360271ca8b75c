//! Thread-safe keyed in-memory storage.
//!
//! Every operation takes the lock synchronously and releases it before
//! returning; the lock is never held across an `.await`. `parking_lot`
//! locks are not poisoned by a panicking writer.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// A keyed record store shared by cloning.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, T> Default for Store<K, T> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, T> Store<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the previous value under `key`.
    pub fn insert(&self, key: K, value: T) -> Option<T> {
        self.data.write().insert(key, value)
    }

    /// Insert only if `key` is vacant. Returns `false` when occupied.
    pub fn insert_new(&self, key: K, value: T) -> bool {
        let mut guard = self.data.write();
        if guard.contains_key(&key) {
            return false;
        }
        guard.insert(key, value);
        true
    }

    pub fn get(&self, key: &K) -> Option<T> {
        self.data.read().get(key).cloned()
    }

    /// Clones of every record matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect()
    }

    /// First record matching `predicate`, in no particular order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| predicate(v)).cloned()
    }

    /// Mutate a record in place under one write lock. `None` if absent.
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.data.write().get_mut(key).map(f)
    }

    pub fn remove(&self, key: &K) -> Option<T> {
        self.data.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
