//! Entity Store - an ordered collection kept in sync with a remote source of truth.
//!
//! Mutations are optimistic: the change is visible immediately, the gateway
//! call runs, and on failure the collection goes back to its pre-mutation
//! snapshot. Callers never observe a half-applied change.
//!
//! ## Example
//!
//! ```
//! use kkultip_sync::{InMemoryGateway, Storage, StorageDraft, StorageStore};
//!
//! # tokio_test_block_on(async {
//! let gateway = InMemoryGateway::<Storage>::new().acting_as(1);
//! let store = StorageStore::new(gateway);
//!
//! store.load(1, false).await;
//! let created = store.add(StorageDraft::new("Work")).await.unwrap();
//! store.rename(created.storage_no, "Office").await.unwrap();
//! assert_eq!(store.items()[0].name, "Office");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod collection;
mod events;
mod options;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::busy::BusySet;
use crate::entity::{Entity, Named, PlaceholderIds};
use crate::error::{StoreError, StoreOp};
use crate::gateway::{Gateway, GatewayError};
use crate::models::{Group, Storage};
use crate::session::SessionProvider;

use collection::{Collection, Restore, Snapshot};
use events::ChangeNotifier;

pub use events::{StoreEvent, CHANGE_EVENT};
pub use options::StoreOptions;

pub type StorageStore<G> = EntityStore<Storage, G>;
pub type GroupStore<G> = EntityStore<Group, G>;

/// Result of a mutation that was not rejected.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The change was applied and confirmed by the gateway.
    Applied,
    /// Nothing happened: the id was busy, or the request was a no-op.
    Skipped,
}

/// Point-in-time copy of everything the UI reads from a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<T: Entity> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub owner: Option<T::Owner>,
}

struct Inner<T: Entity> {
    items: Collection<T>,
    loading: bool,
    error: Option<String>,
    owner: Option<T::Owner>,
    loaded_for: Option<T::Owner>,
    loading_for: Option<T::Owner>,
    load_generation: u64,
}

/// Optimistic store for one entity kind.
///
/// Construct one per collection at application start and hand out
/// references; the collection is only ever changed through these methods.
pub struct EntityStore<T: Entity, G> {
    gateway: G,
    inner: RwLock<Inner<T>>,
    busy: BusySet<T::Id>,
    session: Option<Arc<dyn SessionProvider<T::Owner>>>,
    options: StoreOptions,
    placeholders: Arc<PlaceholderIds>,
    notifier: ChangeNotifier,
}

/// Clears the loading flag if a load future is dropped before the gateway answers.
struct InFlightLoad<'a, T: Entity, G> {
    store: &'a EntityStore<T, G>,
    generation: u64,
    done: bool,
}

impl<T: Entity, G> Drop for InFlightLoad<'_, T, G> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut inner = self.store.write();
        if inner.load_generation == self.generation {
            inner.loading = false;
            inner.loading_for = None;
        }
    }
}

/// Undoes an optimistic change if the mutation future is dropped before the
/// gateway answers.
struct PendingChange<'a, T: Entity, G> {
    store: &'a EntityStore<T, G>,
    snapshot: Option<Snapshot<T>>,
}

impl<T: Entity, G> PendingChange<'_, T, G> {
    /// Hand the snapshot back for an explicit rollback, or drop it on success.
    fn settle(mut self) -> Option<Snapshot<T>> {
        self.snapshot.take()
    }
}

impl<T: Entity, G> Drop for PendingChange<'_, T, G> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            let id = snapshot.id().to_string();
            let restore = self.store.write().items.rollback(snapshot);
            tracing::debug!(kind = T::KIND, %id, ?restore, "mutation cancelled");
        }
    }
}

impl<T: Entity, G> EntityStore<T, G> {
    pub fn new(gateway: G) -> Self {
        EntityStore {
            gateway,
            inner: RwLock::new(Inner {
                items: Collection::default(),
                loading: false,
                error: None,
                owner: None,
                loaded_for: None,
                loading_for: None,
                load_generation: 0,
            }),
            busy: BusySet::new(),
            session: None,
            options: StoreOptions::default(),
            placeholders: Arc::new(PlaceholderIds::new()),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn with_session(mut self, session: Arc<dyn SessionProvider<T::Owner>>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Draw placeholder ids from `ids`, e.g. one source shared by stores
    /// whose entities end up in the same view.
    pub fn with_placeholders(mut self, ids: Arc<PlaceholderIds>) -> Self {
        self.placeholders = ids;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // State only changes in whole steps under the write lock, so a poisoned
    // lock still guards a consistent collection.
    fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn items(&self) -> Vec<T> {
        self.read().items.items().to_vec()
    }

    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.read().items.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().items.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn owner(&self) -> Option<T::Owner> {
        self.read().owner.clone()
    }

    pub fn is_busy(&self, id: &T::Id) -> bool {
        self.busy.is_busy(id)
    }

    pub fn state(&self) -> StoreState<T> {
        let inner = self.read();
        StoreState {
            items: inner.items.items().to_vec(),
            loading: inner.loading,
            error: inner.error.clone(),
            owner: inner.owner.clone(),
        }
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Forget the cached collection and owner, e.g. on logout. An in-flight
    /// load is discarded when it completes.
    pub fn reset(&self) {
        {
            let mut inner = self.write();
            inner.items.rebase();
            inner.loading = false;
            inner.error = None;
            inner.owner = None;
            inner.loaded_for = None;
            inner.loading_for = None;
            inner.load_generation += 1;
        }
        self.notifier.notify(StoreEvent::Reset {
            kind: T::KIND.into(),
        });
    }

    /// Register a listener for JSON-encoded [`StoreEvent`]s. Returns its id.
    #[cfg(feature = "emitter")]
    pub fn on_change<F>(&self, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    #[cfg(feature = "emitter")]
    pub fn off_change(&self, listener_id: &str) -> bool {
        self.notifier.unsubscribe(listener_id)
    }

    fn session_owner(&self) -> Option<T::Owner> {
        self.session.as_ref().and_then(|s| s.current_owner())
    }

    /// Whether the collection still belongs to the owner it had at `epoch`.
    fn is_current(&self, epoch: u64) -> bool {
        self.read().items.epoch() == epoch
    }

    fn message_for(op: StoreOp, err: &GatewayError) -> String {
        err.user_message()
            .map(str::to_owned)
            .unwrap_or_else(|| op.fallback_message::<T>().to_owned())
    }

    fn pending(&self, snapshot: Snapshot<T>) -> PendingChange<'_, T, G> {
        PendingChange {
            store: self,
            snapshot: Some(snapshot),
        }
    }

    /// Restore the pending snapshot, record the error and build the error for the caller.
    fn roll_back(&self, pending: PendingChange<'_, T, G>, op: StoreOp, err: GatewayError) -> StoreError {
        let message = Self::message_for(op, &err);
        let Some(snapshot) = pending.settle() else {
            return StoreError::Gateway {
                op,
                message,
                source: err,
            };
        };
        let id = snapshot.id().to_string();
        let restore = {
            let mut inner = self.write();
            inner.error = Some(message.clone());
            inner.items.rollback(snapshot)
        };
        if restore == Restore::Stale {
            tracing::warn!(kind = T::KIND, %op, %id, error = %err, "mutation failed after owner change");
        } else {
            tracing::warn!(kind = T::KIND, %op, %id, ?restore, error = %err, "optimistic change rolled back");
            self.notifier.notify(StoreEvent::RolledBack {
                kind: T::KIND.into(),
                id,
                message: message.clone(),
            });
        }
        StoreError::Gateway {
            op,
            message,
            source: err,
        }
    }
}

impl<T: Entity, G: Gateway<T>> EntityStore<T, G> {
    /// Fetch the collection for `owner`.
    ///
    /// Skipped when the last successful load was for the same owner, or when
    /// a load for that owner is already in flight, unless `force` is set.
    /// Failures are recorded in [`error`](Self::error), never returned.
    pub async fn load(&self, owner: T::Owner, force: bool) {
        let generation = {
            let mut inner = self.write();
            if !force && inner.loaded_for.as_ref() == Some(&owner) {
                tracing::debug!(kind = T::KIND, ?owner, "load skipped, cached");
                return;
            }
            if !force && inner.loading && inner.loading_for.as_ref() == Some(&owner) {
                tracing::debug!(kind = T::KIND, ?owner, "load skipped, already in flight");
                return;
            }
            if inner.owner.is_some() && inner.owner.as_ref() != Some(&owner) {
                inner.items.rebase();
                inner.loaded_for = None;
            }
            inner.load_generation += 1;
            inner.loading = true;
            inner.error = None;
            inner.owner = Some(owner.clone());
            inner.loading_for = Some(owner.clone());
            inner.load_generation
        };

        let mut in_flight = InFlightLoad {
            store: self,
            generation,
            done: false,
        };
        let result = self.gateway.list(&owner).await;
        in_flight.done = true;

        let event = {
            let mut inner = self.write();
            if inner.load_generation != generation {
                tracing::debug!(kind = T::KIND, ?owner, "load result superseded");
                return;
            }
            inner.loading = false;
            inner.loading_for = None;
            match result {
                Ok(list) => {
                    inner.items.replace(list);
                    inner.loaded_for = Some(owner);
                    inner.error = None;
                    StoreEvent::Loaded {
                        kind: T::KIND.into(),
                        count: inner.items.items().len(),
                    }
                }
                Err(err) => {
                    let message = Self::message_for(StoreOp::Load, &err);
                    tracing::warn!(kind = T::KIND, ?owner, error = %err, "load failed");
                    inner.error = Some(message.clone());
                    StoreEvent::LoadFailed {
                        kind: T::KIND.into(),
                        message,
                    }
                }
            }
        };
        self.notifier.notify(event);
    }

    /// Re-fetch for the current owner, falling back to the session owner.
    pub async fn refresh(&self) {
        let owner = self.owner().or_else(|| self.session_owner());
        match owner {
            Some(owner) => self.load(owner, true).await,
            None => tracing::debug!(kind = T::KIND, "refresh skipped, no owner"),
        }
    }

    /// Create an entity.
    ///
    /// A placeholder is appended at once and swapped in place for the
    /// server-assigned id on success. On failure the placeholder is removed,
    /// the error recorded and returned.
    pub async fn add(&self, draft: T::Draft) -> Result<T, StoreError> {
        T::validate_draft(&draft).map_err(StoreError::InvalidDraft)?;

        let placeholder: T::Id = self.placeholders.next();
        let _busy = self.busy.try_acquire(placeholder.clone());
        let optimistic = T::from_draft(placeholder.clone(), &draft);
        let snapshot = {
            let mut inner = self.write();
            inner.error = None;
            let entity = optimistic.clone();
            inner.items.optimistic(&placeholder, |c| c.push(entity))
        };
        let epoch = snapshot.epoch();
        let pending = self.pending(snapshot);
        tracing::debug!(kind = T::KIND, %placeholder, "optimistic insert");
        self.notifier.notify(StoreEvent::Added {
            kind: T::KIND.into(),
            id: placeholder.to_string(),
        });

        let real = match self.gateway.create(&draft).await {
            Ok(id) => id,
            Err(err) => return Err(self.roll_back(pending, StoreOp::Add, err)),
        };
        let _ = pending.settle();

        let swapped = {
            let mut inner = self.write();
            let swapped = inner.items.swap_id(&placeholder, real.clone(), optimistic, epoch);
            if swapped.is_some() {
                inner.error = None;
            }
            swapped
        };
        let Some(created) = swapped else {
            tracing::debug!(kind = T::KIND, id = %real, "created after owner change, not merged");
            return Ok(T::from_draft(real, &draft));
        };
        tracing::info!(kind = T::KIND, %placeholder, id = %real, "placeholder swapped");
        self.notifier.notify(StoreEvent::Swapped {
            kind: T::KIND.into(),
            placeholder: placeholder.to_string(),
            id: real.to_string(),
        });

        if self.options.resync_after_add {
            let owner = self.session_owner().or_else(|| self.owner());
            if let Some(owner) = owner {
                self.load(owner, true).await;
            }
        }
        Ok(created)
    }

    /// Apply `patch` to the entity `id`.
    ///
    /// Skipped while another mutation on `id` is in flight. When the gateway
    /// returns the updated entity it replaces the optimistic one.
    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<Outcome, StoreError> {
        let Some(_busy) = self.busy.try_acquire(id.clone()) else {
            return Ok(Outcome::Skipped);
        };

        let snapshot = {
            let mut inner = self.write();
            if inner.items.position(&id).is_none() {
                return Err(StoreError::NotFound {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            inner.error = None;
            inner.items.optimistic(&id, |c| {
                c.modify(&id, |e| e.apply(&patch));
            })
        };
        let epoch = snapshot.epoch();
        let pending = self.pending(snapshot);
        tracing::debug!(kind = T::KIND, %id, ?patch, "optimistic update");
        self.notifier.notify(StoreEvent::Updated {
            kind: T::KIND.into(),
            id: id.to_string(),
        });

        let confirmed = match self.gateway.update(&id, &patch).await {
            Ok(confirmed) => confirmed,
            Err(err) => return Err(self.roll_back(pending, StoreOp::Update, err)),
        };
        let _ = pending.settle();

        {
            let mut inner = self.write();
            if inner.items.epoch() == epoch {
                inner.error = None;
                if let Some(server) = confirmed.filter(|e| e.id() == &id) {
                    inner.items.modify(&id, |e| *e = server);
                }
            }
        }
        Ok(Outcome::Applied)
    }

    /// Remove the entity `id`. Skipped while `id` is busy.
    pub async fn remove(&self, id: T::Id) -> Result<Outcome, StoreError> {
        let Some(_busy) = self.busy.try_acquire(id.clone()) else {
            return Ok(Outcome::Skipped);
        };

        let snapshot = {
            let mut inner = self.write();
            if inner.items.position(&id).is_none() {
                return Err(StoreError::NotFound {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            inner.error = None;
            inner.items.optimistic(&id, |c| {
                c.remove(&id);
            })
        };
        let epoch = snapshot.epoch();
        let pending = self.pending(snapshot);
        tracing::debug!(kind = T::KIND, %id, "optimistic remove");
        self.notifier.notify(StoreEvent::Removed {
            kind: T::KIND.into(),
            id: id.to_string(),
        });

        if let Err(err) = self.gateway.delete(&id).await {
            return Err(self.roll_back(pending, StoreOp::Remove, err));
        }
        let _ = pending.settle();
        if !self.is_current(epoch) {
            return Ok(Outcome::Applied);
        }
        self.clear_error();

        if self.options.resync_after_remove {
            if let Some(owner) = self.owner() {
                self.load(owner, true).await;
            }
        }
        Ok(Outcome::Applied)
    }
}

impl<T: Named, G: Gateway<T>> EntityStore<T, G> {
    /// Rename the entity `id`. The name is trimmed; a blank name is a no-op.
    pub async fn rename(&self, id: T::Id, name: &str) -> Result<Outcome, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Outcome::Skipped);
        }
        self.update(id, T::rename_patch(name.to_owned())).await
    }
}
