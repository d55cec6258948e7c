//! Entity store integration tests: optimistic mutations against a gated
//! in-memory server.

mod follow;
mod mutations;
