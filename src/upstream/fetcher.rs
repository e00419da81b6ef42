//! Fetcher Module
//!
//! Resolves one card name with bounded concurrency, a courtesy delay before
//! every request, and exponential backoff on transient failures.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::FetcherConfig;
use crate::models::CardRecord;
use crate::upstream::{Attempt, CardLookup};

// == Fetcher ==
/// Retry driver over a [`CardLookup`].
///
/// All callers sharing one `Fetcher` draw from the same permit pool, so at
/// most `max_concurrent_requests` fetches are in flight at any moment. A
/// permit is held for the whole fetch, backoff sleeps included.
pub struct Fetcher {
    lookup: Arc<dyn CardLookup>,
    permits: Semaphore,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(lookup: Arc<dyn CardLookup>, config: FetcherConfig) -> Self {
        Self {
            lookup,
            permits: Semaphore::new(config.max_concurrent_requests.max(1)),
            config,
        }
    }

    /// Resolves `name`. Never fails: every unsuccessful path yields a
    /// not-found record for the name as submitted.
    pub async fn fetch(&self, name: &str) -> CardRecord {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                error!(card = %name, "Fetcher permit pool closed");
                return CardRecord::not_found(name);
            }
        };

        let max_retries = self.config.max_retries.max(1);
        for attempt in 0..max_retries {
            tokio::time::sleep(self.config.request_delay).await;

            match self.lookup.lookup(name).await {
                Attempt::Found(record) => {
                    info!(card = %name, resolved = %record.name(), "Fetched card");
                    return record;
                }
                Attempt::NotFound => {
                    info!(card = %name, "Card not found upstream");
                    return CardRecord::not_found(name);
                }
                Attempt::Transient(cause) => {
                    warn!(card = %name, attempt = attempt + 1, %cause, "Fetch attempt failed");
                    if attempt + 1 == max_retries {
                        error!(card = %name, attempts = max_retries, "All fetch attempts failed");
                        return CardRecord::not_found(name);
                    }
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Attempt::Fatal(cause) => {
                    error!(card = %name, %cause, "Unexpected error fetching card");
                    return CardRecord::not_found(name);
                }
            }
        }

        CardRecord::not_found(name)
    }

    /// Delay after failed attempt `attempt` (zero-based): `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Permits currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}
