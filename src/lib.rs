//! Card Fetcher - queue-backed card lookup service
//!
//! Resolves card names against the Scryfall API through a bounded queue and
//! a single background worker, serving repeat lookups from a TTL cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod limiter;
pub mod models;
pub mod service;
pub mod tasks;
pub mod upstream;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use service::CardService;
pub use tasks::spawn_cleanup_task;
