//! Shared resolution cache.
//!
//! Stores [`EffectPlan`]s keyed by a digest of everything that can influence
//! the plan. Sharded so worker threads running independent battles contend
//! on different locks; each shard evicts least-recently-used entries once
//! its slice of the capacity fills. Only deterministic plans are cached —
//! chance rolls happen downstream and never enter the cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::plugin::EffectPlan;

/// SHA-256 digest identifying one resolution computation.
///
/// Built from the caster and target attribute snapshots and levels, the
/// skill id and level, and both sides' status fingerprints. Two casts with
/// equal keys are guaranteed to plan identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionKey(pub [u8; 32]);

const SHARD_COUNT: usize = 16;

struct Shard {
    entries: HashMap<ResolutionKey, Entry>,
    clock: u64,
}

struct Entry {
    plan: EffectPlan,
    stamp: u64,
}

impl Shard {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            clock: 0,
        }
    }

    fn touch(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Point-in-time view of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hit ratio in the unit interval; zero when nothing was looked up.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, thread-safe plan cache shared across battles.
pub struct ResolutionCache {
    shards: Vec<Mutex<Shard>>,
    capacity_per_shard: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionCache {
    /// Creates a cache holding at most `capacity` plans in total.
    pub fn new(capacity: usize) -> Self {
        let capacity_per_shard = capacity.div_ceil(SHARD_COUNT).max(1);
        Self {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(Shard::new())).collect(),
            capacity_per_shard,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn shard(&self, key: &ResolutionKey) -> &Mutex<Shard> {
        &self.shards[key.0[0] as usize % SHARD_COUNT]
    }

    /// Looks up a plan, refreshing its recency on a hit.
    pub fn get(&self, key: &ResolutionKey) -> Option<EffectPlan> {
        let mut shard = match self.shard(key).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stamp = shard.touch();
        match shard.entries.get_mut(key) {
            Some(entry) => {
                entry.stamp = stamp;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.plan.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts a plan, evicting the shard's least-recently-used entry when
    /// its slice of the capacity is full.
    pub fn insert(&self, key: ResolutionKey, plan: EffectPlan) {
        let mut shard = match self.shard(&key).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if shard.entries.len() >= self.capacity_per_shard && !shard.entries.contains_key(&key) {
            let victim = shard
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stamp)
                .map(|(key, _)| *key);
            if let Some(victim) = victim {
                shard.entries.remove(&victim);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        let stamp = shard.touch();
        shard.entries.insert(key, Entry { plan, stamp });
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| match shard.lock() {
                Ok(guard) => guard.entries.len(),
                Err(poisoned) => poisoned.into_inner().entries.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. Counters are preserved.
    pub fn clear(&self) {
        for shard in &self.shards {
            let mut guard = match shard.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> ResolutionKey {
        ResolutionKey([byte; 32])
    }

    fn plan(chance: u32) -> EffectPlan {
        EffectPlan {
            chance,
            ops: vec![],
        }
    }

    #[test]
    fn miss_then_hit() {
        let cache = ResolutionCache::new(64);
        assert!(cache.get(&key(1)).is_none());
        cache.insert(key(1), plan(42));
        assert_eq!(cache.get(&key(1)).map(|p| p.chance), Some(42));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn eviction_drops_least_recently_used() {
        // Capacity 16 over 16 shards leaves one slot per shard; two keys in
        // the same shard force an eviction of the older one.
        let cache = ResolutionCache::new(SHARD_COUNT);
        let first = key(0);
        let second = ResolutionKey({
            let mut bytes = [9u8; 32];
            bytes[0] = 0; // same shard as `first`
            bytes
        });

        cache.insert(first, plan(1));
        cache.insert(second, plan(2));

        assert!(cache.get(&first).is_none());
        assert_eq!(cache.get(&second).map(|p| p.chance), Some(2));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn get_refreshes_recency() {
        let cache = ResolutionCache::new(SHARD_COUNT * 2);
        let a = ResolutionKey({
            let mut bytes = [1u8; 32];
            bytes[0] = 0;
            bytes
        });
        let b = ResolutionKey({
            let mut bytes = [2u8; 32];
            bytes[0] = 0;
            bytes
        });
        let c = ResolutionKey({
            let mut bytes = [3u8; 32];
            bytes[0] = 0;
            bytes
        });

        cache.insert(a, plan(1));
        cache.insert(b, plan(2));
        // Touch `a` so `b` becomes the LRU victim.
        assert!(cache.get(&a).is_some());
        cache.insert(c, plan(3));

        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn clear_keeps_counters() {
        let cache = ResolutionCache::new(64);
        cache.insert(key(1), plan(1));
        assert!(cache.get(&key(1)).is_some());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn shared_across_threads() {
        let cache = ResolutionCache::new(1024);
        std::thread::scope(|scope| {
            for worker in 0..4u8 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..32u8 {
                        cache.insert(key(worker.wrapping_mul(32).wrapping_add(i)), plan(1));
                    }
                });
            }
        });
        assert!(cache.len() <= 1024);
        assert!(!cache.is_empty());
    }
}
