//! Bounded key-value cache with insertion-order eviction.
//!
//! Used by the analysis pipeline to reuse column classifications when the
//! same header text repeats across tables or pages of a statement. The cache
//! is owned by the caller and passed by reference; there is no process-wide
//! instance.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A fixed-capacity map that evicts the oldest inserted entry when full.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Eq + Hash + Clone, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: every insert is dropped.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.min(64)),
            order: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Insert a value, evicting the oldest entry if at capacity.
    ///
    /// Re-inserting an existing key replaces the value without changing
    /// its eviction position.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&key) {
            self.map.insert(key, value);
            return;
        }
        if self.map.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache: BoundedCache<String, u32> = BoundedCache::new(4);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(&1));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_eviction_is_insertion_order() {
        let mut cache: BoundedCache<&str, u32> = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None); // oldest evicted
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut cache: BoundedCache<&str, u32> = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10); // update, still oldest
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let mut cache: BoundedCache<&str, u32> = BoundedCache::new(0);
        cache.insert("a", 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn test_clear() {
        let mut cache: BoundedCache<&str, u32> = BoundedCache::new(4);
        cache.insert("a", 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
