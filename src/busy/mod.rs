//! Busy-Set Tracker - per-entity guard against duplicate in-flight mutations.
//!
//! A second mutation on an id that is already busy is dropped by the caller,
//! which is what turns a rapid double-click on "follow" into one request.
//!
//! ```
//! use kkultip_sync::BusySet;
//!
//! let busy = BusySet::new();
//! let guard = busy.try_acquire(7).unwrap();
//! assert!(busy.is_busy(&7));
//! assert!(busy.try_acquire(7).is_none());
//! drop(guard);
//! assert!(!busy.is_busy(&7));
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of identifiers currently undergoing a mutation.
///
/// Membership is the only state, so a poisoned lock is recovered rather
/// than reported.
#[derive(Debug)]
pub struct BusySet<K> {
    ids: Mutex<HashSet<K>>,
}

impl<K> Default for BusySet<K> {
    fn default() -> Self {
        BusySet {
            ids: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone + Debug> BusySet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self) -> MutexGuard<'_, HashSet<K>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self, id: &K) -> bool {
        self.ids().contains(id)
    }

    /// Mark `id` busy. Returns `false` if it already was.
    pub fn begin(&self, id: K) -> bool {
        self.ids().insert(id)
    }

    /// Clear `id`, whether or not it was busy.
    pub fn end(&self, id: &K) {
        self.ids().remove(id);
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }

    /// Check-and-begin in one step. The returned guard ends `id` on drop,
    /// including when the owning future is dropped mid-flight.
    pub fn try_acquire(&self, id: K) -> Option<BusyGuard<'_, K>> {
        if self.begin(id.clone()) {
            Some(BusyGuard { set: self, id })
        } else {
            tracing::debug!(id = ?id, "mutation dropped, id is busy");
            None
        }
    }
}

/// Holds an id in a [`BusySet`] until dropped.
#[must_use = "the id is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard<'a, K: Eq + Hash + Clone + Debug> {
    set: &'a BusySet<K>,
    id: K,
}

impl<K: Eq + Hash + Clone + Debug> BusyGuard<'_, K> {
    pub fn id(&self) -> &K {
        &self.id
    }
}

impl<K: Eq + Hash + Clone + Debug> Drop for BusyGuard<'_, K> {
    fn drop(&mut self) {
        self.set.end(&self.id);
    }
}
