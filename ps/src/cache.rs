//! Ephemeral local cache
//!
//! A caller-managed JSON key-value store. Values live for the lifetime of
//! the process; durability is the remote store's job, never the cache's.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

/// Key-value cache interface consumed by the reconciler
///
/// `set` overwrites unconditionally; read-modify-write sequences are safe
/// because each key has exactly one writer by construction (one active
/// session per conversation).
pub trait CacheStore: Send + Sync {
    /// Get the value for a key, if present
    fn get(&self, key: &str) -> Option<Value>;

    /// Set the value for a key, overwriting any previous value
    fn set(&self, key: &str, value: Value);
}

/// In-memory cache implementation
#[derive(Default)]
pub struct MemoryCache {
    inner: Mutex<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently cached
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let value = self.lock().get(key).cloned();
        debug!(%key, hit = value.is_some(), "MemoryCache::get: called");
        value
    }

    fn set(&self, key: &str, value: Value) {
        debug!(%key, "MemoryCache::set: called");
        self.lock().insert(key.to_string(), value);
    }
}
