// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for per-address vault snapshots.
//!
//! Entries are keyed by lowercase address and kept for a retention window
//! measured against an injected [`Clock`]. `get` hands back the entry's age so
//! the caller decides whether it is fresh enough to skip an RPC read or only
//! good enough as a fallback.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;

use crate::clock::Clock;

/// Cached entry: value + insertion timestamp.
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// A cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
    pub age: Duration,
}

/// In-process LRU cache with clock-driven expiry.
pub struct SnapshotCache<V> {
    cache: Mutex<LruCache<String, CacheEntry<V>>>,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> SnapshotCache<V> {
    /// Create a new cache.
    ///
    /// - `capacity`: Max number of addresses to keep.
    /// - `retention`: Entries this old or older are dropped.
    pub fn new(capacity: usize, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            retention,
            clock,
        }
    }

    /// Get the entry for an address. Returns `None` if missing or expired.
    pub fn get(&self, address: &str) -> Option<Cached<V>> {
        let key = address.to_lowercase();
        let now = self.clock.now();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = cache.get(&key)?;
        let age = now - entry.stored_at;
        if age >= self.retention {
            cache.pop(&key);
            return None;
        }

        Some(Cached {
            value: entry.value.clone(),
            stored_at: entry.stored_at,
            age: age.max(Duration::zero()),
        })
    }

    /// Store a value for an address, stamped with the current time.
    pub fn put(&self, address: &str, value: V) -> DateTime<Utc> {
        let stored_at = self.clock.now();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(address.to_lowercase(), CacheEntry { value, stored_at });
        stored_at
    }

    /// Invalidate the entry for an address.
    pub fn invalidate(&self, address: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.pop(&address.to_lowercase());
    }

    /// Addresses with unexpired entries, most recently used first.
    /// Expired entries are dropped on the way.
    pub fn addresses(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| now - entry.stored_at >= self.retention)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            cache.pop(key);
        }

        cache.iter().map(|(key, _)| key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache(clock: &ManualClock) -> SnapshotCache<u64> {
        SnapshotCache::new(10, Duration::hours(24), Arc::new(clock.clone()))
    }

    #[test]
    fn cache_put_and_get_reports_age() {
        let clock = ManualClock::at_epoch_seconds(1_700_000_000);
        let cache = cache(&clock);

        assert!(cache.get("0xABCD").is_none());
        cache.put("0xABCD", 7);

        clock.advance(Duration::seconds(45));
        let hit = cache.get("0xABCD").unwrap();
        assert_eq!(hit.value, 7);
        assert_eq!(hit.age, Duration::seconds(45));
    }

    #[test]
    fn cache_invalidate() {
        let clock = ManualClock::at_epoch_seconds(0);
        let cache = cache(&clock);
        cache.put("0xABCD", 1);
        cache.invalidate("0xabcd");
        assert!(cache.get("0xABCD").is_none());
    }

    #[test]
    fn cache_expires_without_sleeping() {
        let clock = ManualClock::at_epoch_seconds(1_700_000_000);
        let cache = cache(&clock);
        cache.put("0xABCD", 1);

        clock.advance(Duration::hours(24) - Duration::seconds(1));
        assert!(cache.get("0xABCD").is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get("0xABCD").is_none());
    }

    #[test]
    fn cache_case_insensitive() {
        let clock = ManualClock::at_epoch_seconds(0);
        let cache = cache(&clock);
        cache.put("0xABCD", 1);
        assert!(cache.get("0xabcd").is_some());
    }

    #[test]
    fn addresses_skip_expired_entries() {
        let clock = ManualClock::at_epoch_seconds(0);
        let cache = cache(&clock);
        cache.put("0xAAAA", 1);
        clock.advance(Duration::hours(23));
        cache.put("0xBBBB", 2);
        clock.advance(Duration::hours(2));

        assert_eq!(cache.addresses(), vec!["0xbbbb".to_string()]);
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let clock = ManualClock::at_epoch_seconds(0);
        let cache: SnapshotCache<u8> = SnapshotCache::new(2, Duration::hours(1), Arc::new(clock));
        cache.put("0x1", 1);
        cache.put("0x2", 2);
        cache.put("0x3", 3);
        assert!(cache.get("0x1").is_none());
        assert!(cache.get("0x3").is_some());
    }
}
