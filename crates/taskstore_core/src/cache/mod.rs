//! Read-through response cache boundary.
//!
//! # Responsibility
//! - Derive deterministic cache keys from resource type and identifiers.
//! - Hold cloned values with a fixed expiry until explicitly invalidated.
//!
//! # Invariants
//! - Expired entries behave exactly like misses and are evicted on access.
//! - The cache never reaches into the repository layer; callers decide what
//!   to load and when to invalidate.

use crate::model::entity::EntityId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default expiry for cached reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Deterministic key for a single resource instance, e.g. `urn:todo:42`.
pub fn cache_key(resource: &str, id: EntityId) -> String {
    format!("urn:{resource}:{id}")
}

/// Deterministic key for a resource listing, e.g. `urn:todo:list`.
pub fn cache_key_list(resource: &str) -> String {
    format!("urn:{resource}:list")
}

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// In-process TTL cache for one value type.
///
/// Single-threaded like the session layer; interior mutability keeps the
/// read path `&self`.
pub struct MemoryCache<T: Clone> {
    entries: RefCell<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the cached value, treating expired entries as misses.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a value under the key with the given expiry.
    pub fn set(&self, key: &str, value: T, ttl: Duration) {
        self.entries.borrow_mut().insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drops the entry for the key, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of stored entries, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Serves the key from cache, invoking `loader` on a miss and storing
    /// its result. Loader failures are returned unchanged and nothing is
    /// cached for them.
    pub fn read_through<Err>(
        &self,
        key: &str,
        ttl: Duration,
        loader: impl FnOnce() -> Result<T, Err>,
    ) -> Result<T, Err> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = loader()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{cache_key, cache_key_list, MemoryCache};
    use std::time::Duration;

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(cache_key("todo", 42), "urn:todo:42");
        assert_eq!(cache_key_list("todo"), "urn:todo:list");
    }

    #[test]
    fn read_through_loads_once_within_ttl() {
        let cache = MemoryCache::new();
        let mut loads = 0;

        for _ in 0..3 {
            let value: Result<i64, ()> =
                cache.read_through("urn:todo:1", Duration::from_secs(30), || {
                    loads += 1;
                    Ok(7)
                });
            assert_eq!(value, Ok(7));
        }
        assert_eq!(loads, 1);
    }

    #[test]
    fn expired_entry_is_a_miss_and_gets_evicted() {
        let cache = MemoryCache::new();
        cache.set("urn:todo:1", 7_i64, Duration::ZERO);
        assert_eq!(cache.get("urn:todo:1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = MemoryCache::new();
        cache.set("urn:todo:1", 7_i64, Duration::from_secs(30));
        cache.invalidate("urn:todo:1");

        let reloaded: Result<i64, ()> =
            cache.read_through("urn:todo:1", Duration::from_secs(30), || Ok(8));
        assert_eq!(reloaded, Ok(8));
    }

    #[test]
    fn loader_failure_is_not_cached() {
        let cache = MemoryCache::<i64>::new();
        let failed: Result<i64, &str> =
            cache.read_through("urn:todo:1", Duration::from_secs(30), || Err("down"));
        assert_eq!(failed, Err("down"));
        assert!(cache.is_empty());
    }
}
