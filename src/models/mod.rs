//! Concrete entities of the tip-sharing client.

mod follow;
mod group;
mod storage;

pub use follow::{FollowPatch, FollowTarget};
pub use group::{Group, GroupDraft, GroupPatch};
pub use storage::{Storage, StorageDraft, StoragePatch};

/// Server-side user number. Owner key of every personal collection.
pub type UserNo = i64;

pub(crate) fn trimmed(name: &str) -> String {
    name.trim().to_string()
}
