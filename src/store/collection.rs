//! Ordered entity collection with snapshot/rollback.
//!
//! Every optimistic mutation runs in three phases: take a [`Snapshot`],
//! apply the change, and on failure [`Collection::rollback`]. The
//! collection keeps a revision counter so a rollback can tell whether
//! anything else changed it while the gateway call was suspended, and an
//! epoch that moves when the collection is handed to another owner. Work
//! started under an older epoch never writes into the current items.

use std::collections::HashSet;

use crate::entity::Entity;

#[derive(Debug, Clone)]
pub(crate) struct Collection<T: Entity> {
    items: Vec<T>,
    revision: u64,
    epoch: u64,
}

/// How [`Collection::rollback`] undid a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Restore {
    /// The whole pre-mutation collection is current again.
    Whole,
    /// Only the touched entity was restored.
    Entity,
    /// The collection changed owner since; nothing was restored.
    Stale,
}

/// Pre-mutation copy of the collection, used only for rollback.
#[derive(Debug)]
pub(crate) struct Snapshot<T: Entity> {
    items: Vec<T>,
    id: T::Id,
    before: Option<(usize, T)>,
    applied_at: u64,
    epoch: u64,
}

impl<T: Entity> Snapshot<T> {
    /// Id of the entity the snapshotted mutation touches.
    pub fn id(&self) -> &T::Id {
        &self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            items: Vec::new(),
            revision: 0,
            epoch: 0,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    /// Replace everything, keeping the first entity for each id.
    pub fn replace(&mut self, list: Vec<T>) {
        let mut seen = HashSet::with_capacity(list.len());
        self.items = list
            .into_iter()
            .filter(|e| seen.insert(e.id().clone()))
            .collect();
        self.revision += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Empty the collection for a new owner. Snapshots and placeholders
    /// taken before become stale.
    pub fn rebase(&mut self) {
        self.items.clear();
        self.revision += 1;
        self.epoch += 1;
    }

    pub fn push(&mut self, entity: T) {
        self.items.push(entity);
        self.revision += 1;
    }

    pub fn modify(&mut self, id: &T::Id, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|e| e.id() == id) {
            Some(entity) => {
                f(entity);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let index = self.position(id)?;
        self.revision += 1;
        Some(self.items.remove(index))
    }

    /// Run `apply` as an optimistic change to `id` and return the snapshot
    /// that undoes it.
    pub fn optimistic(&mut self, id: &T::Id, apply: impl FnOnce(&mut Self)) -> Snapshot<T> {
        let before = self
            .position(id)
            .map(|index| (index, self.items[index].clone()));
        let items = self.items.clone();
        apply(self);
        Snapshot {
            items,
            id: id.clone(),
            before,
            applied_at: self.revision,
            epoch: self.epoch,
        }
    }

    /// Undo the change recorded in `snapshot`.
    ///
    /// When nothing else touched the collection since the optimistic apply,
    /// the whole snapshot becomes current state again. Otherwise only the
    /// touched entity is restored so concurrent changes to other ids
    /// survive. A snapshot from an older epoch is ignored.
    pub fn rollback(&mut self, snapshot: Snapshot<T>) -> Restore {
        let Snapshot {
            items,
            id,
            before,
            applied_at,
            epoch,
        } = snapshot;

        if epoch != self.epoch {
            return Restore::Stale;
        }
        if self.revision == applied_at {
            self.items = items;
            self.revision += 1;
            return Restore::Whole;
        }

        self.items.retain(|e| e.id() != &id);
        if let Some((index, entity)) = before {
            let index = index.min(self.items.len());
            self.items.insert(index, entity);
        }
        self.revision += 1;
        Restore::Entity
    }

    /// Swap a placeholder id for the server-assigned one, in place.
    ///
    /// If the real id is already present (a reload raced the create), the
    /// placeholder is dropped instead. If the placeholder is gone, `created`
    /// is appended. Returns the entity now holding `real`, or `None` when
    /// the placeholder was issued under an older epoch.
    pub fn swap_id(&mut self, placeholder: &T::Id, real: T::Id, created: T, epoch: u64) -> Option<T> {
        if epoch != self.epoch {
            return None;
        }
        if let Some(existing) = self.get(&real).cloned() {
            self.items.retain(|e| e.id() != placeholder);
            self.revision += 1;
            return Some(existing);
        }
        if self.modify(placeholder, |e| e.set_id(real.clone())) {
            if let Some(entity) = self.get(&real) {
                return Some(entity.clone());
            }
        }
        let mut created = created;
        created.set_id(real);
        self.push(created.clone());
        Some(created)
    }
}
