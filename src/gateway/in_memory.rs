//! InMemoryGateway - Server stand-in for development and testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use super::wire::{decode_list, FromWire};
use super::{Gateway, GatewayError};
use crate::entity::Entity;

/// Gateway operation, used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    List,
    Create,
    Update,
    Delete,
}

struct Inner<T: Entity> {
    records: Vec<(T::Owner, T)>,
    acting_owner: Option<T::Owner>,
    next_id: i64,
    calls: HashMap<GatewayOp, usize>,
    fail_next: HashMap<GatewayOp, VecDeque<GatewayError>>,
    fail_always: HashMap<GatewayOp, GatewayError>,
}

/// In-memory gateway backed by a `Vec` of `(owner, entity)` records.
///
/// Ids are assigned from a counter starting at 1. Clone-friendly via Arc:
/// a clone kept by a test observes the calls made through the store's copy.
pub struct InMemoryGateway<T: Entity> {
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T: Entity> Clone for InMemoryGateway<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> Default for InMemoryGateway<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryGateway<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                records: Vec::new(),
                acting_owner: None,
                next_id: 1,
                calls: HashMap::new(),
                fail_next: HashMap::new(),
                fail_always: HashMap::new(),
            })),
        }
    }

    /// Owner that newly created entities are filed under.
    pub fn acting_as(self, owner: T::Owner) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.acting_owner = Some(owner);
        }
        self
    }

    /// First id handed out by `create`.
    pub fn ids_from(self, first: i64) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.next_id = first;
        }
        self
    }

    /// Seed an entity for `owner`. Later generated ids skip past seeded ones.
    pub fn seed(&self, owner: T::Owner, entity: T)
    where
        T::Id: Into<i64>,
    {
        if let Ok(mut inner) = self.inner.write() {
            let id: i64 = entity.id().clone().into();
            if id >= inner.next_id {
                inner.next_id = id + 1;
            }
            inner.records.push((owner, entity));
        }
    }

    /// Seed from a JSON response body, in any shape [`wire`](super::wire) accepts.
    pub fn seed_json(&self, owner: T::Owner, body: &[u8]) -> Result<usize, GatewayError>
    where
        T: FromWire,
        T::Id: Into<i64>,
    {
        let entities = decode_list::<T>(body)?;
        let count = entities.len();
        for entity in entities {
            self.seed(owner.clone(), entity);
        }
        Ok(count)
    }

    /// Fail the next call of `op` with `err`. Queued failures are consumed in order.
    pub fn fail_next(&self, op: GatewayOp, err: GatewayError) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_next.entry(op).or_default().push_back(err);
        }
    }

    /// Fail every call of `op` until [`recover`](Self::recover) is called.
    pub fn fail_always(&self, op: GatewayOp, err: GatewayError) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_always.insert(op, err);
        }
    }

    /// Drop all injected failures.
    pub fn recover(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_next.clear();
            inner.fail_always.clear();
        }
    }

    /// Number of calls made for `op`, failed ones included.
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.inner
            .read()
            .map(|inner| inner.calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Server-side view of the entities filed under `owner`.
    pub fn records(&self, owner: &T::Owner) -> Vec<T> {
        self.inner
            .read()
            .map(|inner| {
                inner
                    .records
                    .iter()
                    .filter(|(o, _)| o == owner)
                    .map(|(_, e)| e.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Count the call and return the injected failure for `op`, if any.
    fn enter(&self, op: GatewayOp) -> Result<std::sync::RwLockWriteGuard<'_, Inner<T>>, GatewayError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| GatewayError::Transport("in-memory gateway lock poisoned".into()))?;
        *inner.calls.entry(op).or_insert(0) += 1;
        if let Some(err) = inner.fail_next.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        if let Some(err) = inner.fail_always.get(&op) {
            return Err(err.clone());
        }
        Ok(inner)
    }

    fn not_found(id: &T::Id) -> GatewayError {
        GatewayError::Status {
            status: 404,
            message: Some(format!("{} {} not found", T::KIND, id)),
        }
    }
}

impl<T> Gateway<T> for InMemoryGateway<T>
where
    T: Entity,
    T::Id: From<i64>,
{
    async fn list(&self, owner: &T::Owner) -> Result<Vec<T>, GatewayError> {
        let inner = self.enter(GatewayOp::List)?;
        Ok(inner
            .records
            .iter()
            .filter(|(o, _)| o == owner)
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn create(&self, draft: &T::Draft) -> Result<T::Id, GatewayError> {
        let mut inner = self.enter(GatewayOp::Create)?;
        T::validate_draft(draft).map_err(|message| GatewayError::Status {
            status: 400,
            message: Some(message),
        })?;
        let owner = inner.acting_owner.clone().ok_or(GatewayError::Status {
            status: 401,
            message: None,
        })?;
        let id = T::Id::from(inner.next_id);
        inner.next_id += 1;
        inner.records.push((owner, T::from_draft(id.clone(), draft)));
        Ok(id)
    }

    async fn update(&self, id: &T::Id, patch: &T::Patch) -> Result<Option<T>, GatewayError> {
        let mut inner = self.enter(GatewayOp::Update)?;
        let record = inner
            .records
            .iter_mut()
            .find(|(_, e)| e.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.1.apply(patch);
        Ok(Some(record.1.clone()))
    }

    async fn delete(&self, id: &T::Id) -> Result<(), GatewayError> {
        let mut inner = self.enter(GatewayOp::Delete)?;
        let before = inner.records.len();
        inner.records.retain(|(_, e)| e.id() != id);
        if inner.records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
