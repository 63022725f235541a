//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cached responses.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;
use crate::interceptor::ResponseCache;

/// Spawns a background task that periodically purges expired responses.
///
/// Expired entries are never served either way; this only bounds memory held
/// by responses nobody asks for again.
///
/// Returns a JoinHandle that can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(state.cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<ResponseCache<MemoryStore>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {}ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.store().cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired responses", removed);
            } else {
                debug!("TTL cleanup: no expired responses found");
            }
        }
    })
}
