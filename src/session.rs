//! Identity/session provider - who the current actor is.
//!
//! Stores use it for the default owner key of personal collections ("my
//! storages") and never authenticate on their own.

use std::fmt::Debug;
use std::sync::{PoisonError, RwLock};

pub trait SessionProvider<O>: Send + Sync {
    /// Owner key of the signed-in actor, `None` when signed out.
    fn current_owner(&self) -> Option<O>;
}

/// Session whose owner is set explicitly (login, logout, tests).
#[derive(Debug, Default)]
pub struct StaticSession<O> {
    owner: RwLock<Option<O>>,
}

impl<O: Clone + Debug + Send + Sync> StaticSession<O> {
    pub fn new() -> Self {
        StaticSession {
            owner: RwLock::new(None),
        }
    }

    pub fn signed_in(owner: O) -> Self {
        StaticSession {
            owner: RwLock::new(Some(owner)),
        }
    }

    pub fn sign_in(&self, owner: O) {
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = Some(owner);
    }

    pub fn sign_out(&self) {
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl<O: Clone + Debug + Send + Sync> SessionProvider<O> for StaticSession<O> {
    fn current_owner(&self) -> Option<O> {
        self.owner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
