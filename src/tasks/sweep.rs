//! Expired-Entry Sweep Task
//!
//! Optional background task that periodically reclaims expired cache entries.
//! Expiration is otherwise checked lazily on read, so keys written once and
//! never read again would accumulate without this sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It acquires a write lock on the cache store to remove
/// expired entries.
///
/// # Arguments
/// * `store` - Shared reference to the cache store
/// * `interval` - Time between sweep runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(Some(Duration::from_secs(300)))));
/// let sweep_handle = spawn_sweep_task(store.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.sweep_expired()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let store = Arc::new(RwLock::new(CacheStore::new(Some(Duration::from_secs(300)))));

        // Add an entry with very short TTL
        {
            let mut store_guard = store.write().await;
            store_guard.set(
                "expire_soon".to_string(),
                json!("value"),
                Some(Duration::from_millis(50)),
            );
        }

        // Spawn sweep task with a short interval
        let handle = spawn_sweep_task(store.clone(), Duration::from_millis(100));

        // Wait for the entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(300)).await;

        // Verify the entry was removed without a read touching it
        {
            let store_guard = store.read().await;
            assert_eq!(store_guard.len(), 0, "Expired entry should have been swept");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let store = Arc::new(RwLock::new(CacheStore::new(Some(Duration::from_secs(300)))));

        // Add an entry with long TTL
        {
            let mut store_guard = store.write().await;
            store_guard.set(
                "long_lived".to_string(),
                json!("value"),
                Some(Duration::from_secs(3600)),
            );
        }

        let handle = spawn_sweep_task(store.clone(), Duration::from_millis(50));

        // Wait for a few sweeps to run
        tokio::time::sleep(Duration::from_millis(200)).await;

        // Verify the entry still exists
        {
            let mut store_guard = store.write().await;
            let result = store_guard.get("long_lived");
            assert_eq!(result, Some(json!("value")), "Valid entry should not be removed");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let store = Arc::new(RwLock::new(CacheStore::new(None)));

        let handle = spawn_sweep_task(store, Duration::from_millis(50));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify the task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
