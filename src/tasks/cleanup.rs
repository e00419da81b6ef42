//! TTL Cleanup Task
//!
//! Background task that periodically drops expired card records so the cache
//! does not hold dead entries until the next insert at capacity.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns the sweeper. It runs until `shutdown` is cancelled.
///
/// # Example
/// ```ignore
/// let shutdown = CancellationToken::new();
/// let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60), shutdown.clone());
/// // Later, during shutdown:
/// shutdown.cancel();
/// handle.await?;
/// ```
pub fn spawn_cleanup_task(
    cache: SharedCache,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting TTL cleanup task");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("TTL cleanup task shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = cache.write().await.cleanup_expired();
            if removed > 0 {
                info!(removed, "TTL cleanup removed expired cards");
            } else {
                debug!("TTL cleanup found no expired cards");
            }
        }
    })
}
