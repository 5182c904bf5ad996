//! Admission control for browser pages.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::RenderError;

/// Caps the number of pages open at once.
///
/// Callers beyond the cap queue for up to `acquire_timeout`, then fail with
/// [`RenderError::PoolExhausted`]. A permit is held for the lifetime of one
/// page and released on drop.
#[derive(Debug, Clone)]
pub struct PagePool {
    permits: Arc<Semaphore>,
    capacity: usize,
    acquire_timeout: Duration,
}

impl PagePool {
    pub fn new(capacity: usize, acquire_timeout: Duration) -> Self {
        Self { permits: Arc::new(Semaphore::new(capacity)), capacity, acquire_timeout }
    }

    /// Wait for a free page slot.
    ///
    /// # Errors
    ///
    /// `RenderError::PoolExhausted` if no slot frees up in time,
    /// `RenderError::BrowserClosed` if the pool was closed.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, RenderError> {
        match tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(RenderError::BrowserClosed),
            Err(_) => {
                tracing::warn!(capacity = self.capacity, "no browser page available");
                Err(RenderError::PoolExhausted {
                    capacity: self.capacity,
                    waited_ms: self.acquire_timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Number of pages that could be opened right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reject all pending and future acquires.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_beyond_capacity_times_out() {
        let pool = PagePool::new(1, Duration::from_millis(250));
        let held = pool.acquire().await.unwrap();
        assert_eq!(pool.available(), 0);

        let result = pool.acquire().await;
        assert!(matches!(result, Err(RenderError::PoolExhausted { capacity: 1, waited_ms: 250 })));

        drop(held);
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_acquire_succeeds_when_released() {
        let pool = PagePool::new(1, Duration::from_secs(5));
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.is_ok() })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(held);

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_pool_rejects() {
        let pool = PagePool::new(2, Duration::from_secs(1));
        pool.close();
        assert!(matches!(pool.acquire().await, Err(RenderError::BrowserClosed)));
        assert_eq!(pool.capacity(), 2);
    }
}
