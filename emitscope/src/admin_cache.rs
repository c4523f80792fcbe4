//! Time-bounded cache of admin-unit search results.
//!
//! Region names are resolved to admin units on every inventory request, and
//! the unit list changes rarely. The cache is process-scoped state owned by
//! whoever builds the service, shared across requests through `Arc`.
//!
//! # Concurrency
//!
//! Reads take a shared `parking_lot::RwLock` guard; inserts take the write
//! guard briefly. Two requests missing at the same time both fetch and the
//! last insert wins. An expired entry is never returned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::clock::Clock;
use crate::source::{AdminUnit, RegionLevel};

/// Default lifetime of a cached search result.
pub const DEFAULT_ADMIN_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

type CacheKey = (RegionLevel, String);

#[derive(Debug, Clone)]
struct CacheEntry {
    units: Vec<AdminUnit>,
    inserted_at: Instant,
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// TTL cache keyed by (level, normalized name).
pub struct AdminCache<C: Clock> {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: C,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<C: Clock> AdminCache<C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached units for a search, if present and not expired.
    pub fn get(&self, level: RegionLevel, name: &str) -> Option<Vec<AdminUnit>> {
        let key = cache_key(level, name);
        let now = self.clock.now();

        let found = self
            .entries
            .read()
            .get(&key)
            .filter(|entry| now.duration_since(entry.inserted_at) < self.ttl)
            .map(|entry| entry.units.clone());

        match found {
            Some(units) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(units)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a search result, replacing any previous entry.
    pub fn insert(&self, level: RegionLevel, name: &str, units: Vec<AdminUnit>) {
        let entry = CacheEntry {
            units,
            inserted_at: self.clock.now(),
        };
        self.entries.write().insert(cache_key(level, name), entry);
    }

    /// Drop one entry.
    pub fn invalidate(&self, level: RegionLevel, name: &str) -> bool {
        self.entries.write().remove(&cache_key(level, name)).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    pub fn stats(&self) -> AdminCacheStats {
        AdminCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().len(),
        }
    }
}

/// Names are matched case- and whitespace-insensitively.
fn cache_key(level: RegionLevel, name: &str) -> CacheKey {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    (level, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn misiones() -> Vec<AdminUnit> {
        vec![AdminUnit {
            id: "ARG.14_1".to_string(),
            name: "Misiones".to_string(),
            full_name: "Misiones, ARG".to_string(),
            country: Some("ARG".to_string()),
        }]
    }

    fn cache() -> (Arc<ManualClock>, AdminCache<Arc<ManualClock>>) {
        let clock = Arc::new(ManualClock::new());
        let cache = AdminCache::new(Duration::from_secs(60), Arc::clone(&clock));
        (clock, cache)
    }

    #[test]
    fn test_hit_before_expiry() {
        let (clock, cache) = cache();
        cache.insert(RegionLevel::Province, "Misiones", misiones());

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(RegionLevel::Province, "Misiones"), Some(misiones()));
    }

    #[test]
    fn test_expired_entry_not_returned() {
        let (clock, cache) = cache();
        cache.insert(RegionLevel::Province, "Misiones", misiones());

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get(RegionLevel::Province, "Misiones"), None);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_key_normalization() {
        let (_clock, cache) = cache();
        cache.insert(RegionLevel::Province, "  Tierra   del Fuego ", misiones());
        assert!(cache.get(RegionLevel::Province, "tierra del fuego").is_some());
        assert!(cache.get(RegionLevel::Department, "tierra del fuego").is_none());
    }

    #[test]
    fn test_refresh_resets_age() {
        let (clock, cache) = cache();
        cache.insert(RegionLevel::Province, "Misiones", misiones());
        clock.advance(Duration::from_secs(50));
        cache.insert(RegionLevel::Province, "Misiones", Vec::new());
        clock.advance(Duration::from_secs(50));

        assert_eq!(cache.get(RegionLevel::Province, "Misiones"), Some(Vec::new()));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (_clock, cache) = cache();
        cache.insert(RegionLevel::Province, "Misiones", misiones());
        cache.insert(RegionLevel::Department, "Capital", misiones());

        assert!(cache.invalidate(RegionLevel::Province, "misiones"));
        assert!(!cache.invalidate(RegionLevel::Province, "misiones"));
        assert_eq!(cache.stats().entries, 1);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let (_clock, cache) = cache();
        cache.get(RegionLevel::Province, "Misiones");
        cache.insert(RegionLevel::Province, "Misiones", misiones());
        cache.get(RegionLevel::Province, "Misiones");
        cache.get(RegionLevel::Province, "Misiones");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_concurrent_readers() {
        let (_clock, cache) = cache();
        let cache = Arc::new(cache);
        cache.insert(RegionLevel::Province, "Misiones", misiones());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get(RegionLevel::Province, "Misiones").is_some())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
