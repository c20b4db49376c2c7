//! In-memory cache for storing key-value pairs.
//!
//! Uses moka's high-performance concurrent cache implementation.

use std::time::Duration;

use moka::sync::Cache;

/// Thread-safe in-memory cache with configurable capacity.
///
/// Used for storing:
/// - Built dialog trees (`MemCache<String, Arc<DialogTree>>`)
/// - Conversation engines (`MemCache<String, Arc<Mutex<DialogEngine>>>`)
///
/// The cache is backed by moka, which provides:
/// - Thread-safe concurrent access
/// - LRU eviction when capacity is exceeded
/// - Optional expiry of idle entries
#[derive(Clone)]
pub struct MemCache<K, V> {
    variables: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`].
    pub fn new(capacity: usize) -> Self {
        Self {
            variables: Cache::new(capacity as u64),
        }
    }

    /// Allocate a new [`MemCache`] whose entries expire after `idle` without access.
    pub fn with_time_to_idle(
        capacity: usize,
        idle: Duration,
    ) -> Self {
        Self {
            variables: Cache::builder().max_capacity(capacity as u64).time_to_idle(idle).build(),
        }
    }

    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.variables.insert(key, value);
    }

    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.variables.get(key)
    }

    /// Value of `key`, created by `init` when absent. Concurrent callers for
    /// the same key share one `init` run, a failed `init` caches nothing.
    pub fn try_get_with<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E>
    where
        E: Clone + Send + Sync + 'static,
    {
        self.variables.try_get_with(key, init).map_err(|e| (*e).clone())
    }

    pub fn remove(
        &self,
        key: &K,
    ) {
        self.variables.invalidate(key);
    }

    /// Number of live entries, pending maintenance is run first.
    pub fn len(&self) -> usize {
        self.variables.run_pending_tasks();
        self.variables.entry_count() as usize
    }
}

#[cfg(test)]
mod test {
    use super::MemCache;

    #[test]
    fn test_cache_set_get_remove() {
        let cache: MemCache<String, u32> = MemCache::new(16);
        cache.set("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.len(), 1);

        cache.remove(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_cache_try_get_with() {
        let cache: MemCache<String, u32> = MemCache::new(16);
        assert_eq!(cache.try_get_with("a".to_string(), || Err::<u32, String>("nope".into())), Err("nope".to_string()));
        assert_eq!(cache.get(&"a".to_string()), None);

        assert_eq!(cache.try_get_with("a".to_string(), || Ok::<u32, String>(1)), Ok(1));
        assert_eq!(cache.try_get_with("a".to_string(), || Ok::<u32, String>(2)), Ok(1));
    }
}
