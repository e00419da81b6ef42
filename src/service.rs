//! Card Service
//!
//! Application context owning the cache, the admission limiter, and the
//! queue worker. This is the only surface the HTTP layer talks to.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::cache::{CacheStats, CardCache, SharedCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::export::cards_to_csv;
use crate::limiter::RateLimiter;
use crate::models::{CardSelection, LookupResult};
use crate::upstream::{Connector, ScryfallClient};
use crate::worker::QueueWorker;

// == Service Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub queue_size: usize,
    pub cache_size: usize,
    pub is_running: bool,
}

// == Card Service ==
pub struct CardService {
    cache: SharedCache,
    limiter: Mutex<RateLimiter>,
    worker: QueueWorker,
}

impl CardService {
    pub fn new(cache: SharedCache, limiter: RateLimiter, worker: QueueWorker) -> Self {
        Self {
            cache,
            limiter: Mutex::new(limiter),
            worker,
        }
    }

    /// Builds the service against the configured upstream.
    pub fn from_config(config: &Config) -> Self {
        Self::with_connector(config, ScryfallClient::connector(config.fetcher()))
    }

    /// Builds the service with a custom upstream connector.
    pub fn with_connector(config: &Config, connector: Connector) -> Self {
        let cache: SharedCache = Arc::new(RwLock::new(CardCache::new(
            config.cache_size,
            Duration::from_secs(config.cache_ttl),
        )));
        let worker = QueueWorker::new(
            Arc::clone(&cache),
            connector,
            config.fetcher(),
            config.worker(),
        );
        let limiter = RateLimiter::new(
            config.rate_limit,
            Duration::from_secs(config.rate_limit_period),
        );
        Self::new(cache, limiter, worker)
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn worker(&self) -> &QueueWorker {
        &self.worker
    }

    pub async fn start(&self) {
        self.worker.start().await;
    }

    pub async fn shutdown(&self) {
        self.worker.stop().await;
    }

    /// Consumes one admission from the limiter.
    pub async fn check_rate_limit(&self) -> Result<()> {
        if self.limiter.lock().await.is_allowed() {
            Ok(())
        } else {
            warn!("Rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }

    /// Answers from the cache when possible, otherwise queues the name.
    pub async fn enqueue_or_lookup(&self, name: &str) -> LookupResult {
        let cached = self.cache.write().await.get(name);
        if let Some(record) = cached {
            return LookupResult::cached(&record);
        }

        let queued = self.worker.enqueue(name).await;
        LookupResult::pending(name, queued)
    }

    /// Looks up every selected name in order, or returns every cached record.
    pub async fn bulk_lookup(&self, selection: &CardSelection) -> Vec<LookupResult> {
        let names = match selection {
            CardSelection::AllCached => {
                return self
                    .cache
                    .read()
                    .await
                    .values()
                    .iter()
                    .map(LookupResult::cached)
                    .collect();
            }
            CardSelection::Names(names) => names,
        };

        let mut results = Vec::with_capacity(names.len());
        for name in names {
            results.push(self.enqueue_or_lookup(name).await);
        }
        results
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            queue_size: self.worker.queue_size(),
            cache_size: self.cache.read().await.len(),
            is_running: self.worker.is_running(),
        }
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Empties the cache and cycles the worker. Queued names are kept.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
        self.worker.stop().await;
        self.worker.start().await;
        info!("All cards cleared");
    }

    /// CSV of the selected names, or of every cached name sorted.
    pub async fn export_csv(&self, selection: &CardSelection) -> String {
        let mut cache = self.cache.write().await;
        let names = match selection {
            CardSelection::AllCached => {
                let mut keys = cache.keys();
                keys.sort();
                keys
            }
            CardSelection::Names(names) => names.clone(),
        };

        let rows: Vec<_> = names
            .iter()
            .map(|name| (name.as_str(), cache.get(name)))
            .collect();
        cards_to_csv(rows)
    }
}
