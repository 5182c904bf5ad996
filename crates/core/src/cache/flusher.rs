//! Background task that periodically writes the cache to disk.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Cache;

/// Handle to a running flush task.
///
/// Dropping the handle leaves the task running; call [`Flusher::shutdown`]
/// to stop it and perform a final flush.
#[derive(Debug)]
pub struct Flusher {
    handle: JoinHandle<()>,
    stop: Arc<Notify>,
}

/// Spawn a task that flushes `cache` every `interval`.
///
/// Flush failures are logged and retried at the next tick; they never reach
/// request handling.
pub fn spawn(cache: Cache, interval: Duration) -> Flusher {
    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; nothing has changed since load.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => flush_logged(&cache).await,
                _ = stopped.notified() => break,
            }
        }

        flush_logged(&cache).await;
        tracing::info!(path = %cache.path().display(), "cache flusher stopped");
    });

    Flusher { handle, stop }
}

impl Flusher {
    /// Stop the task after one final flush and wait for it to finish.
    pub async fn shutdown(self) {
        self.stop.notify_one();
        if let Err(e) = self.handle.await {
            tracing::error!("cache flusher task failed: {e}");
        }
    }
}

async fn flush_logged(cache: &Cache) {
    if let Err(e) = cache.flush().await {
        tracing::warn!(path = %cache.path().display(), error = %e, "cache flush failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, Category, load_from_durable};
    use crate::payload::ResponsePayload;
    use tempfile::TempDir;

    fn offers() -> ResponsePayload {
        ResponsePayload::Discounts { offers: vec!["IL: 12%".into()] }
    }

    #[tokio::test]
    async fn test_shutdown_performs_final_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = Cache::with_store(CacheStore::default(), &path);

        let flusher = spawn(cache.clone(), Duration::from_secs(3600));
        cache
            .put(Category::Discounts, Category::DISCOUNTS_KEY, offers())
            .unwrap();
        flusher.shutdown().await;

        let loaded = load_from_durable(&path).await;
        assert_eq!(loaded, cache.snapshot());
    }

    #[tokio::test]
    async fn test_flushes_on_interval() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = Cache::with_store(CacheStore::default(), &path);

        let flusher = spawn(cache.clone(), Duration::from_millis(50));
        cache
            .put(Category::Discounts, Category::DISCOUNTS_KEY, offers())
            .unwrap();

        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert!(path.exists());
        assert!(!load_from_durable(&path).await.discounts.is_empty());
        flusher.shutdown().await;
    }
}
