use std::collections::HashMap;
use std::time::Duration;

use crate::key::global_key;

/// A shared key-value cache for decoded blob text.
///
/// Implementations provide their own synchronization; callers never lock
/// around `get`/`set`. Concurrent writers of the same key race and the last
/// one wins.
pub trait BlobCache: Send + Sync {
    /// Look up a value. Expired entries are absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value. A zero `ttl` means the entry does not expire.
    fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Remove a value if present.
    fn delete(&self, key: &str);

    /// Look up several values at once. Missing keys are absent from the map.
    ///
    /// Default implementation calls `get()` for each key.
    fn get_many(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .filter_map(|key| self.get(key).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Build a tenant-independent key from a namespace and components.
    fn make_global_key(&self, namespace: &str, components: &[&str]) -> String {
        global_key(namespace, components)
    }
}
