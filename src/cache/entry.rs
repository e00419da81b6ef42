//! Cache Entry Module
//!
//! A cached card record together with its expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

use crate::models::CardRecord;

// == Cache Entry ==
/// A single cache entry: the record and the instant it stops being visible.
///
/// Deadlines use tokio's monotonic clock so a paused test runtime can drive
/// expiry deterministically.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored record
    pub record: CardRecord,
    /// First instant at which the entry is expired
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after now.
    pub fn new(record: CardRecord, ttl: Duration) -> Self {
        Self {
            record,
            expires_at: Instant::now() + ttl,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`; visible strictly before.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CardRecord {
        CardRecord::found("Opt", "Scry 1. Draw a card.", "{U}", "Instant", "Ixalan")
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_visible_before_ttl() {
        let entry = CacheEntry::new(record(), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_deadline() {
        let entry = CacheEntry::new(record(), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewrite_restarts_deadline() {
        let first = CacheEntry::new(record(), Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(4)).await;
        let second = CacheEntry::new(record(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(first.is_expired());
        assert!(!second.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(record(), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
