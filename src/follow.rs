//! Follow toggling over a follower/following list.
//!
//! Flipping "follow" is an optimistic update of one [`FollowTarget`] plus the
//! actor's following count. Both are rolled back together when the gateway
//! rejects the change.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::entity::Entity;
use crate::error::StoreError;
use crate::gateway::Gateway;
use crate::models::{FollowPatch, FollowTarget, UserNo};
use crate::store::{EntityStore, Outcome};

pub struct FollowBoard<G> {
    actor: UserNo,
    store: EntityStore<FollowTarget, G>,
    following_count: AtomicI64,
}

impl<G: Gateway<FollowTarget>> FollowBoard<G> {
    pub fn new(actor: UserNo, gateway: G) -> Self {
        FollowBoard {
            actor,
            store: EntityStore::new(gateway),
            following_count: AtomicI64::new(0),
        }
    }

    pub fn actor(&self) -> UserNo {
        self.actor
    }

    /// The underlying list store (items, loading, error).
    pub fn store(&self) -> &EntityStore<FollowTarget, G> {
        &self.store
    }

    pub fn following_count(&self) -> i64 {
        self.following_count.load(Ordering::SeqCst)
    }

    /// Overwrite the count with the server's value, e.g. from a fresh profile.
    pub fn set_following_count(&self, count: i64) {
        self.following_count.store(count, Ordering::SeqCst);
    }

    /// Load the list owned by `owner` (whose followers or followings are shown).
    pub async fn load(&self, owner: UserNo, force: bool) {
        self.store.load(owner, force).await;
    }

    /// Follow or unfollow `target`, whichever flips its current state.
    ///
    /// Skipped while a toggle on the same target is in flight.
    pub async fn toggle(&self, target: UserNo) -> Result<Outcome, StoreError> {
        if target == self.actor {
            return Err(StoreError::SelfTarget);
        }
        if self.store.is_busy(&target) {
            return Ok(Outcome::Skipped);
        }
        let current = self
            .store
            .get(&target)
            .ok_or_else(|| StoreError::NotFound {
                kind: FollowTarget::KIND,
                id: target.to_string(),
            })?;

        let following = !current.is_following;
        let delta = if following { 1 } else { -1 };
        self.following_count.fetch_add(delta, Ordering::SeqCst);

        let result = self
            .store
            .update(target, FollowPatch::SetFollowing { following })
            .await;
        match result {
            Ok(Outcome::Applied) => Ok(Outcome::Applied),
            other => {
                self.following_count.fetch_sub(delta, Ordering::SeqCst);
                other
            }
        }
    }
}
