mod busy;
mod entity;
mod error;
mod follow;
mod gateway;
pub mod grid;
mod models;
pub mod realtime;
mod session;
mod store;

pub use busy::{BusyGuard, BusySet};
pub use entity::{Entity, EntityId, Messages, Named, PlaceholderIds};
pub use error::{StoreError, StoreOp};
pub use follow::FollowBoard;
pub use gateway::{wire, Gateway, GatewayError, GatewayOp, InMemoryGateway};
pub use models::{
    FollowPatch, FollowTarget, Group, GroupDraft, GroupPatch, Storage, StorageDraft, StoragePatch,
    UserNo,
};
pub use session::{SessionProvider, StaticSession};
pub use store::{
    EntityStore, GroupStore, Outcome, StorageStore, StoreEvent, StoreOptions, StoreState,
    CHANGE_EVENT,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
