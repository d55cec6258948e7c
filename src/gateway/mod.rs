//! Remote Mutation Gateway - the network side of an entity store.
//!
//! A gateway performs the actual list/create/update/delete calls for one
//! entity kind and classifies failures into [`GatewayError`]. It must never
//! swallow an error: any non-2xx response or transport failure is an `Err`.
//!
//! The HTTP client itself lives outside this crate. [`wire`] holds the decode
//! step such a client runs on response bodies, and [`InMemoryGateway`] is a
//! server stand-in for development and tests.

mod error;
mod in_memory;
pub mod wire;

use std::future::Future;

use crate::entity::Entity;

pub use error::GatewayError;
pub use in_memory::{GatewayOp, InMemoryGateway};

/// Remote operations for entities of type `T`.
pub trait Gateway<T: Entity>: Send + Sync {
    /// Fetch the whole collection for `owner`.
    fn list(&self, owner: &T::Owner) -> impl Future<Output = Result<Vec<T>, GatewayError>> + Send;

    /// Create an entity and return its server-assigned id.
    fn create(&self, draft: &T::Draft) -> impl Future<Output = Result<T::Id, GatewayError>> + Send;

    /// Apply `patch` remotely. Returns the updated entity when the server sends one back.
    fn update(
        &self,
        id: &T::Id,
        patch: &T::Patch,
    ) -> impl Future<Output = Result<Option<T>, GatewayError>> + Send;

    fn delete(&self, id: &T::Id) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
