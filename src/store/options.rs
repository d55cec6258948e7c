use serde::Deserialize;

/// Reconciliation behaviour of an [`EntityStore`](super::EntityStore).
///
/// Deserializable so it can come from a JSON config file:
///
/// ```
/// use kkultip_sync::StoreOptions;
///
/// let options: StoreOptions = serde_json::from_str(r#"{ "resyncAfterAdd": true }"#).unwrap();
/// assert!(options.resync_after_add);
/// assert!(!options.resync_after_remove);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// Re-fetch the session owner's list after a successful add.
    pub resync_after_add: bool,
    /// Re-fetch the current owner's list after a successful remove.
    pub resync_after_remove: bool,
}

impl StoreOptions {
    /// Re-fetch after both add and remove, the way "my storages" behaves.
    pub fn resyncing() -> Self {
        StoreOptions {
            resync_after_add: true,
            resync_after_remove: true,
        }
    }

    pub fn resync_after_add(mut self, on: bool) -> Self {
        self.resync_after_add = on;
        self
    }

    pub fn resync_after_remove(mut self, on: bool) -> Self {
        self.resync_after_remove = on;
        self
    }
}
