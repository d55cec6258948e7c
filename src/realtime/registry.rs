use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Live subscription handle returned by the pub/sub client.
pub trait Subscription: Send {
    fn unsubscribe(&mut self);
}

impl<F: FnMut() + Send> Subscription for F {
    fn unsubscribe(&mut self) {
        self()
    }
}

struct Entry<H> {
    handle: H,
    refs: usize,
}

/// Subscriptions keyed by destination, reference counted.
///
/// Many listeners can ask for the same destination; the client subscribes
/// once for the first and unsubscribes once after the last lets go.
pub struct SubscriptionRegistry<H> {
    entries: Mutex<BTreeMap<String, Entry<H>>>,
}

impl<H> Default for SubscriptionRegistry<H> {
    fn default() -> Self {
        SubscriptionRegistry {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<H: Subscription> SubscriptionRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Entry<H>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a reference to `destination`, calling `connect` only if it is not
    /// subscribed yet. Returns the new reference count.
    pub fn subscribe<E>(
        &self,
        destination: &str,
        connect: impl FnOnce(&str) -> Result<H, E>,
    ) -> Result<usize, E> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(destination) {
            entry.refs += 1;
            return Ok(entry.refs);
        }
        let handle = connect(destination)?;
        tracing::debug!(destination, "subscribed");
        entries.insert(destination.to_string(), Entry { handle, refs: 1 });
        Ok(1)
    }

    /// Drop one reference. Returns `true` when this tore the subscription down.
    pub fn unsubscribe(&self, destination: &str) -> bool {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(destination) else {
            return false;
        };
        entry.refs -= 1;
        if entry.refs > 0 {
            return false;
        }
        if let Some(mut entry) = entries.remove(destination) {
            entry.handle.unsubscribe();
            tracing::debug!(destination, "unsubscribed");
        }
        true
    }

    /// Re-establish every live destination after a reconnect, keeping
    /// reference counts. Old handles belong to the dead connection and are
    /// dropped without unsubscribing. Destinations whose `connect` fails are
    /// returned with their error and stay registered.
    pub fn resubscribe_all<E>(
        &self,
        mut connect: impl FnMut(&str) -> Result<H, E>,
    ) -> Vec<(String, E)> {
        let mut entries = self.entries();
        let mut failed = Vec::new();
        for (destination, entry) in entries.iter_mut() {
            match connect(destination) {
                Ok(handle) => entry.handle = handle,
                Err(err) => failed.push((destination.clone(), err)),
            }
        }
        tracing::debug!(count = entries.len(), failed = failed.len(), "resubscribed");
        failed
    }

    /// Tear down every subscription regardless of reference counts.
    pub fn unsubscribe_all(&self) {
        let drained = std::mem::take(&mut *self.entries());
        for (_, mut entry) in drained {
            entry.handle.unsubscribe();
        }
    }

    pub fn destinations(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    pub fn ref_count(&self, destination: &str) -> usize {
        self.entries().get(destination).map_or(0, |e| e.refs)
    }
}
