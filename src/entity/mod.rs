//! Entities - Uniquely identified records tracked by an [`EntityStore`](crate::EntityStore).
//!
//! An entity knows its identifier, how to build itself from a create
//! payload (`Draft`), and how to apply an update payload (`Patch`). The
//! store never inspects fields beyond that.
//!
//! ## Example
//!
//! ```
//! use kkultip_sync::{Entity, Named, Storage, StorageDraft};
//!
//! let draft = StorageDraft::new("  Work ");
//! let mut storage = Storage::from_draft(7, &draft);
//! assert_eq!(storage.name, "Work");
//!
//! storage.apply(&Storage::rename_patch("Home".into()));
//! assert_eq!(storage.name, "Home");
//! ```

mod id;

use std::fmt::Debug;

pub use id::{EntityId, PlaceholderIds};

/// Fallback user-facing messages, one per store operation.
///
/// Used when the gateway error carries no server-provided message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub load: &'static str,
    pub add: &'static str,
    pub update: &'static str,
    pub remove: &'static str,
}

/// A record with a stable identifier, held in an ordered collection.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Stable identifier type.
    type Id: EntityId;

    /// Scope under which a collection is loaded and cached (usually a user number).
    type Owner: Clone + Eq + Debug + Send + Sync + 'static;

    /// Create payload.
    type Draft: Clone + Debug + Send + Sync;

    /// Update payload.
    type Patch: Clone + Debug + Send + Sync;

    /// Short kind name used in logs and events ("storage", "group", ...).
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    fn set_id(&mut self, id: Self::Id);

    /// Build the entity the server would create for `draft` under `id`.
    fn from_draft(id: Self::Id, draft: &Self::Draft) -> Self;

    /// Apply an update payload in place.
    fn apply(&mut self, patch: &Self::Patch);

    /// Reject a create payload before anything is applied.
    fn validate_draft(_draft: &Self::Draft) -> Result<(), String> {
        Ok(())
    }

    fn messages() -> Messages;
}

/// Entities with a user-editable display name.
pub trait Named: Entity {
    fn rename_patch(name: String) -> Self::Patch;
}
