//! Kernel cache
//!
//! LRU cache for kernel matrix values used by the SMO solver. Kernel matrices are
//! symmetric, so `K(i, j)` and `K(j, i)` share one entry.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache key for kernel values, normalized so that i <= j
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    i: usize,
    j: usize,
}

impl CacheKey {
    fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }
}

/// LRU cache for kernel matrix values
pub struct KernelCache {
    cache: LruCache<CacheKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache sized for a full `n` x `n` symmetric matrix
    pub fn for_samples(n: usize) -> Self {
        Self::new(n * (n + 1) / 2)
    }

    /// Look up `K(i, j)`, computing and storing it on a miss
    pub fn get_or_compute<F>(&mut self, i: usize, j: usize, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let key = CacheKey::new(i, j);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            return value;
        }
        self.misses += 1;
        let value = compute();
        self.cache.put(key, value);
        value
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.cap().get(),
            size: self.cache.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_entries_share_a_slot() {
        let mut cache = KernelCache::new(4);
        assert_eq!(cache.get_or_compute(0, 1, || 5.0), 5.0);
        assert_eq!(cache.get_or_compute(1, 0, || 99.0), 5.0);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = KernelCache::new(2);
        cache.get_or_compute(0, 1, || 1.0);
        cache.get_or_compute(1, 2, || 2.0);
        cache.get_or_compute(2, 3, || 3.0); // evicts (0, 1)

        assert_eq!(cache.get_or_compute(0, 1, || -1.0), -1.0);
        assert_eq!(cache.get_or_compute(2, 3, || -3.0), 3.0);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = KernelCache::for_samples(3);
        assert_eq!(cache.stats().capacity, 6);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.get_or_compute(0, 0, || 1.0);
        cache.get_or_compute(0, 0, || 1.0);
        assert_eq!(cache.hit_rate(), 0.5);
    }
}
