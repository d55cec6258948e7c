//! Realtime notifications - subscription bookkeeping for the pub/sub client.
//!
//! The STOMP-over-WebSocket client stays outside this crate. What lives here
//! is the registry that decides when a destination is actually subscribed or
//! torn down, and which destinations to restore after a reconnect.

mod registry;

pub use registry::{Subscription, SubscriptionRegistry};

pub const TOPIC_PREFIX: &str = "/topic";
pub const USER_PREFIX: &str = "/user";

/// Per-user notification queue, routed by the broker to the signed-in session.
pub const USER_NOTIFICATIONS: &str = "/user/queue/notifications";

/// Broadcast topic `name`, e.g. `topic("feed")` is `/topic/feed`.
pub fn topic(name: &str) -> String {
    format!("{}/{}", TOPIC_PREFIX, name.trim_start_matches('/'))
}
