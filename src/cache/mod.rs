//! Cache Module
//!
//! In-memory card cache with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CardCache;

/// Cache handle shared between request handlers, the worker, and the sweeper.
pub type SharedCache = Arc<RwLock<CardCache>>;
