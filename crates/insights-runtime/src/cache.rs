//! Small key → (value, expiry) cache.
//!
//! Entries expire individually; an expired entry is treated as absent and is
//! dropped on the next lookup. The `*_at` variants take an explicit clock so
//! expiry can be tested without sleeping.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Time-to-live cache keyed by fetch identity.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Value for `key` if it has not expired at `now`.
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        let ttl = self.ttl;
        self.insert_with_ttl_at(key, value, ttl, now);
    }

    /// Insert with a per-entry TTL overriding the cache default.
    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        self.insert_with_ttl_at(key, value, ttl, Instant::now());
    }

    pub fn insert_with_ttl_at(&mut self, key: K, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until next touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(secs: u64) -> TtlCache<&'static str, u32> {
        TtlCache::new(Duration::from_secs(secs))
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut c = cache(60);
        let t0 = Instant::now();
        c.insert_at("posts", 7, t0);
        assert_eq!(c.get_at(&"posts", t0 + Duration::from_secs(59)), Some(7));
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let mut c = cache(60);
        let t0 = Instant::now();
        c.insert_at("posts", 7, t0);
        assert_eq!(c.get_at(&"posts", t0 + Duration::from_secs(60)), None);
        assert!(c.is_empty());
    }

    #[test]
    fn test_per_entry_ttl() {
        let mut c = cache(60);
        let t0 = Instant::now();
        c.insert_with_ttl_at("page", 1, Duration::from_secs(300), t0);
        c.insert_at("posts", 2, t0);
        let later = t0 + Duration::from_secs(120);
        assert_eq!(c.get_at(&"page", later), Some(1));
        assert_eq!(c.get_at(&"posts", later), None);
    }

    #[test]
    fn test_reinsert_replaces_value_and_expiry() {
        let mut c = cache(10);
        let t0 = Instant::now();
        c.insert_at("k", 1, t0);
        c.insert_at("k", 2, t0 + Duration::from_secs(8));
        assert_eq!(c.get_at(&"k", t0 + Duration::from_secs(15)), Some(2));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut c = cache(60);
        c.insert("a", 1);
        c.insert("b", 2);
        assert!(c.invalidate(&"a"));
        assert!(!c.invalidate(&"a"));
        assert_eq!(c.get(&"b"), Some(2));
        c.clear();
        assert!(c.get(&"b").is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut c = cache(0);
        let t0 = Instant::now();
        c.insert_at("k", 1, t0);
        assert_eq!(c.get_at(&"k", t0), None);
    }
}
