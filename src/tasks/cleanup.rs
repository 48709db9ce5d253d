//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Each wake-up removes expired keys in batches of at most `batch_size`,
/// releasing the cache lock and yielding between batches so callers are
/// never blocked for an unbounded time.
///
/// # Arguments
/// * `cache` - Handle to the shared cache
/// * `interval` - Time between sweeps
/// * `batch_size` - Maximum keys removed per lock acquisition (minimum 1)
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(1000);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1), 256);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Cache, interval: Duration, batch_size: usize) -> JoinHandle<()> {
    let batch_size = batch_size.max(1);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {:?} and batch size {}",
            interval, batch_size
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = sweep(&cache, batch_size).await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

/// Runs batches until one comes back short. Returns the total removed.
async fn sweep(cache: &Cache, batch_size: usize) -> usize {
    let mut total = 0;
    loop {
        let removed = cache.purge_expired(batch_size);
        total += removed;
        if removed < batch_size {
            return total;
        }
        tokio::task::yield_now().await;
    }
}
