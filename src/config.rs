//! Configuration Module
//!
//! Handles loading service configuration from environment variables and
//! deriving the per-component settings for the fetcher and queue worker.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream lookup endpoint (fuzzy name search)
    pub api_base_url: String,
    /// Total timeout for a single upstream request, in seconds
    pub request_timeout: u64,
    /// Attempts per fetch before giving up
    pub max_retries: u32,
    /// Courtesy pause before each upstream attempt, in milliseconds
    pub rate_limit_delay_ms: u64,
    /// Capacity of the pending-name queue
    pub max_queue_size: usize,
    /// Names pulled from the queue per worker iteration
    pub batch_size: usize,
    /// Maximum number of cached records
    pub cache_size: usize,
    /// Lifetime of a cached record in seconds
    pub cache_ttl: u64,
    /// HTTP bind address
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Admitted `/fetch` calls per window
    pub rate_limit: usize,
    /// Rate limit window in seconds
    pub rate_limit_period: u64,
    /// Simultaneous in-flight upstream calls
    pub max_concurrent_requests: usize,
    /// How long `enqueue` waits for queue space, in seconds
    pub enqueue_timeout: u64,
    /// How long `stop` waits for the worker before aborting it, in seconds
    pub stop_grace_period: u64,
    /// Expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` (default: `https://api.scryfall.com/cards/named`)
    /// - `REQUEST_TIMEOUT` (default: 30)
    /// - `MAX_RETRIES` (default: 3)
    /// - `RATE_LIMIT_DELAY_MS` (default: 100)
    /// - `MAX_QUEUE_SIZE` (default: 1000)
    /// - `BATCH_SIZE` (default: 10)
    /// - `CACHE_SIZE` (default: 1000)
    /// - `CACHE_TTL` (default: 86400)
    /// - `SERVER_HOST` (default: 0.0.0.0)
    /// - `SERVER_PORT` (default: 8080)
    /// - `RATE_LIMIT` (default: 10)
    /// - `RATE_LIMIT_PERIOD` (default: 60)
    /// - `MAX_CONCURRENT_REQUESTS` (default: 5)
    /// - `ENQUEUE_TIMEOUT` (default: 5)
    /// - `STOP_GRACE_PERIOD` (default: 60)
    /// - `CLEANUP_INTERVAL` (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            max_retries: env_or("MAX_RETRIES", defaults.max_retries),
            rate_limit_delay_ms: env_or("RATE_LIMIT_DELAY_MS", defaults.rate_limit_delay_ms),
            max_queue_size: env_or("MAX_QUEUE_SIZE", defaults.max_queue_size),
            batch_size: env_or("BATCH_SIZE", defaults.batch_size),
            cache_size: env_or("CACHE_SIZE", defaults.cache_size),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            rate_limit: env_or("RATE_LIMIT", defaults.rate_limit),
            rate_limit_period: env_or("RATE_LIMIT_PERIOD", defaults.rate_limit_period),
            max_concurrent_requests: env_or(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            ),
            enqueue_timeout: env_or("ENQUEUE_TIMEOUT", defaults.enqueue_timeout),
            stop_grace_period: env_or("STOP_GRACE_PERIOD", defaults.stop_grace_period),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }

    /// Settings for the upstream fetcher.
    pub fn fetcher(&self) -> FetcherConfig {
        FetcherConfig {
            api_base_url: self.api_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout),
            max_retries: self.max_retries.max(1),
            request_delay: Duration::from_millis(self.rate_limit_delay_ms),
            backoff_base: Duration::from_secs(1),
            max_concurrent_requests: self.max_concurrent_requests.max(1),
        }
    }

    /// Settings for the queue worker.
    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            max_queue_size: self.max_queue_size.max(1),
            batch_size: self.batch_size.max(1),
            enqueue_timeout: Duration::from_secs(self.enqueue_timeout),
            stop_grace_period: Duration::from_secs(self.stop_grace_period),
            ..WorkerConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.scryfall.com/cards/named".to_string(),
            request_timeout: 30,
            max_retries: 3,
            rate_limit_delay_ms: 100,
            max_queue_size: 1000,
            batch_size: 10,
            cache_size: 1000,
            cache_ttl: 86400,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            rate_limit: 10,
            rate_limit_period: 60,
            max_concurrent_requests: 5,
            enqueue_timeout: 5,
            stop_grace_period: 60,
            cleanup_interval: 60,
        }
    }
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Fetcher Config ==
/// Upstream fetch behavior: retries, pacing, and the concurrency ceiling.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Attempts per fetch, at least 1
    pub max_retries: u32,
    /// Fixed pause before every attempt
    pub request_delay: Duration,
    /// Backoff after attempt `n` is `backoff_base * 2^n`
    pub backoff_base: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Config::default().fetcher()
    }
}

// == Worker Config ==
/// Queue sizing and the timing knobs of the background loop.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub max_queue_size: usize,
    pub batch_size: usize,
    /// Wait for queue space in `enqueue`
    pub enqueue_timeout: Duration,
    /// Per-item wait while collecting a batch
    pub dequeue_timeout: Duration,
    /// Pause after collecting an empty batch
    pub idle_pause: Duration,
    /// Pause after an internal error before resuming
    pub error_pause: Duration,
    /// Voluntary shutdown window before the loop is aborted
    pub stop_grace_period: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 1000,
            batch_size: 10,
            enqueue_timeout: Duration::from_secs(5),
            dequeue_timeout: Duration::from_secs(1),
            idle_pause: Duration::from_millis(100),
            error_pause: Duration::from_secs(1),
            stop_grace_period: Duration::from_secs(60),
        }
    }
}
