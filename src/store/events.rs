//! Change notifications for the UI binding layer.
//!
//! Listeners receive a JSON-encoded [`StoreEvent`] on every state change.
//! With the `emitter` feature off, notifications are dropped.

use serde::{Deserialize, Serialize};

#[cfg(feature = "emitter")]
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "emitter")]
use crate::EventEmitter;

/// Name under which store events are emitted.
pub const CHANGE_EVENT: &str = "change";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Loaded { kind: String, count: usize },
    LoadFailed { kind: String, message: String },
    Added { kind: String, id: String },
    Swapped { kind: String, placeholder: String, id: String },
    Updated { kind: String, id: String },
    Removed { kind: String, id: String },
    RolledBack { kind: String, id: String, message: String },
    Reset { kind: String },
}

impl StoreEvent {
    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

pub(crate) struct ChangeNotifier {
    #[cfg(feature = "emitter")]
    emitter: Mutex<EventEmitter>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier {
            #[cfg(feature = "emitter")]
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    #[cfg(feature = "emitter")]
    pub fn subscribe<F>(&self, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(CHANGE_EVENT, listener)
    }

    #[cfg(feature = "emitter")]
    pub fn unsubscribe(&self, listener_id: &str) -> bool {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_listener(listener_id)
            .is_some()
    }

    #[cfg(feature = "emitter")]
    pub fn notify(&self, event: StoreEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "store event could not be encoded");
                return;
            }
        };
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(CHANGE_EVENT, payload);
    }

    #[cfg(not(feature = "emitter"))]
    pub fn notify(&self, _event: StoreEvent) {}
}
