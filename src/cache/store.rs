//! Card Cache Module
//!
//! Expiring, capacity-bounded map from a submitted card name to its record.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::models::CardRecord;

// == Card Cache ==
/// Card records keyed by the name they were requested under.
///
/// Every entry lives for `ttl` from its last write. When a new name arrives at
/// capacity, expired entries are purged first and only then is the least
/// recently used live entry evicted.
#[derive(Debug)]
pub struct CardCache {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    capacity: usize,
    ttl: Duration,
}

impl CardCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` records for `ttl` each.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    // == Set ==
    /// Stores a record under `name`, replacing any previous one and restarting its TTL.
    pub fn set(&mut self, name: impl Into<String>, record: CardRecord) {
        let name = name.into();

        if !self.entries.contains_key(&name) && self.entries.len() >= self.capacity {
            self.cleanup_expired();
            if self.entries.len() >= self.capacity {
                if let Some(evicted) = self.lru.evict_oldest() {
                    debug!(card = %evicted, "Evicting least recently used card");
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
            }
        }

        self.entries.insert(name.clone(), CacheEntry::new(record, self.ttl));
        self.lru.touch(&name);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a copy of the live record for `name`, refreshing its recency.
    ///
    /// An expired entry is dropped and reported as absent.
    pub fn get(&mut self, name: &str) -> Option<CardRecord> {
        match self.entries.get(name) {
            Some(entry) if !entry.is_expired() => {
                let record = entry.record.clone();
                self.lru.touch(name);
                self.stats.record_hit();
                Some(record)
            }
            Some(_) => {
                self.remove_entry(name);
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// True if a live entry exists. Does not affect recency or statistics.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Snapshots ==
    /// Snapshot of all live records.
    pub fn values(&self) -> Vec<CardRecord> {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.record.clone())
            .collect()
    }

    /// Snapshot of all names with a live entry.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(name, _)| name.clone())
            .collect()
    }

    // == Clear ==
    /// Drops every entry and resets the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.reset();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(name, _)| name.clone())
            .collect();

        for name in &expired {
            self.remove_entry(name);
        }
        expired.len()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    // == Length ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_entry(&mut self, name: &str) {
        self.entries.remove(name);
        self.lru.remove(name);
        self.stats.set_total_entries(self.entries.len());
    }
}
