// [libs/core/panel/src/locks.rs]
//! A process-wide registry of named mutexes, lazily created on first use.
//!
//! Not part of the claim/watchdog protocol's own mutual-exclusion
//! guarantee — that comes from the store's atomic claim. This exists for
//! collaborators built on top of the panel (e.g. an ingester that can't
//! tolerate two concurrent logins against the same upstream) that need
//! their own exclusion keyed by something other than a mission id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tokio::sync::Mutex as AsyncMutex;

pub struct NamedLockRegistry {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Default for NamedLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedLockRegistry {
    pub fn new() -> Self {
        Self { locks: Mutex::new(HashMap::new()) }
    }

    /// Returns the lock for `key`, creating it if this is the first request
    /// for that key. Cloning the returned `Arc` is cheap; hold the guard
    /// returned by `.lock().await` for as long as the critical section lasts.
    pub fn get(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("named lock registry poisoned");
        locks.entry(key.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }
}

/// A shared default instance for callers that don't need per-component
/// isolation — most reference ingesters built on this crate can just use
/// this one registry keyed by upstream URL.
pub static DEFAULT_REGISTRY: Lazy<NamedLockRegistry> = Lazy::new(NamedLockRegistry::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_same_key_always_resolves_to_the_same_lock() {
        let registry = NamedLockRegistry::new();
        let a = registry.get("https://example.com/feed");
        let b = registry.get("https://example.com/feed");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_keys_get_distinct_locks() {
        let registry = NamedLockRegistry::new();
        let a = registry.get("feed-a");
        let b = registry.get("feed-b");
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
