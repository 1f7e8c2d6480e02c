// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded cache of synthesized type descriptions.
//!
//! Keyed by generation id. Entries may be evicted at any time once the cache
//! is full; an evicted entry is just a miss and gets synthesized again. The
//! whole check-compute-store sequence runs under one mutex, so two callers
//! never end up holding different descriptions for the same generation
//! while both are cached.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;

use crate::store::GenerationId;
use crate::synth::TypeDescription;

/// Default number of descriptions kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Duration of the most recent synthesis, in nanoseconds.
    pub last_miss_ns: u64,
}

/// LRU cache from generation id to synthesized description.
pub struct ReconstructionCache {
    inner: Mutex<LruCache<GenerationId, Arc<TypeDescription>>>,
    stats: Mutex<CacheStats>,
}

impl ReconstructionCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Return the cached description for `id`, computing and storing it on a
    /// miss. Errors from `compute` are returned and nothing is cached.
    pub fn get_or_compute<F, E>(
        &self,
        id: GenerationId,
        compute: F,
    ) -> Result<Arc<TypeDescription>, E>
    where
        F: FnOnce() -> Result<TypeDescription, E>,
    {
        let mut cache = self.inner.lock();
        if let Some(hit) = cache.get(&id) {
            let hit = Arc::clone(hit);
            drop(cache);
            self.record_hit();
            log::debug!("[ReconstructionCache] hit for generation {}", id);
            return Ok(hit);
        }

        let start = Instant::now();
        let built = Arc::new(compute()?);
        cache.put(id, Arc::clone(&built));
        drop(cache);

        self.record_miss(start);
        log::debug!("[ReconstructionCache] stored generation {}", id);
        Ok(built)
    }

    /// Cached description for `id`, if still present.
    pub fn get(&self, id: GenerationId) -> Option<Arc<TypeDescription>> {
        self.inner.lock().get(&id).map(Arc::clone)
    }

    /// Drop the entry for `id`. Returns whether one was present.
    pub fn evict(&self, id: GenerationId) -> bool {
        self.inner.lock().pop(&id).is_some()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    fn record_hit(&self) {
        let mut stats = self.stats.lock();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.lock();
        stats.misses = stats.misses.saturating_add(1);
        stats.last_miss_ns = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
    }
}

impl Default for ReconstructionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn description(name: &str) -> TypeDescription {
        TypeDescription {
            name: name.to_string(),
            explicit: false,
            evolvable: true,
            fields: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = ReconstructionCache::new(4);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(description("Order"))
        };

        let a = cache.get_or_compute(GenerationId(1), compute).unwrap();
        let b = cache
            .get_or_compute(GenerationId(1), || Ok::<_, ()>(description("other")))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ReconstructionCache::new(4);
        let err = cache
            .get_or_compute(GenerationId(1), || Err::<TypeDescription, _>("boom"))
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());

        cache
            .get_or_compute(GenerationId(1), || Ok::<_, &str>(description("Order")))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_is_a_silent_miss() {
        let cache = ReconstructionCache::new(2);
        for id in 1..=3 {
            cache
                .get_or_compute(GenerationId(id), || Ok::<_, ()>(description("T")))
                .unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(GenerationId(1)).is_none());

        let again = cache
            .get_or_compute(GenerationId(1), || Ok::<_, ()>(description("T")))
            .unwrap();
        assert_eq!(again.name, "T");
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn explicit_evict_and_clear() {
        let cache = ReconstructionCache::new(4);
        cache
            .get_or_compute(GenerationId(1), || Ok::<_, ()>(description("T")))
            .unwrap();
        assert!(cache.evict(GenerationId(1)));
        assert!(!cache.evict(GenerationId(1)));

        cache
            .get_or_compute(GenerationId(2), || Ok::<_, ()>(description("T")))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(ReconstructionCache::new(0).capacity(), 1);
    }

    #[test]
    fn concurrent_callers_share_one_synthesis() {
        let cache = Arc::new(ReconstructionCache::new(8));
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_compute(GenerationId(42), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(description("Order"))
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<TypeDescription>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
