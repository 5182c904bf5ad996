//! Lifetime of one browser page within a render.
//!
//! `Idle -> PageOpen -> (Extracted | ExtractionFailed) -> PageClosed`.
//! Once a page is open, [`load_then_close`] closes it exactly once whether the
//! load succeeded, failed, or ran past the render timeout.

use std::time::Duration;

use url::Url;

use super::{RenderError, RenderOptions};

/// An open page that can load one URL and be closed.
#[async_trait::async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url`, wait up to `settle_timeout` for the network to go
    /// idle, and return the DOM plus the final URL.
    async fn load(&self, url: &Url, settle_timeout: Duration) -> Result<(String, Url), RenderError>;

    /// Release the page. Failures are logged, not returned.
    async fn close(&self);
}

/// Load `url` on `page` under the render timeout, then close the page.
pub async fn load_then_close<S: PageSession + ?Sized>(
    page: &S, url: &Url, opts: &RenderOptions,
) -> Result<(String, Url), RenderError> {
    let result = match tokio::time::timeout(opts.timeout(), page.load(url, opts.settle_timeout())).await {
        Ok(loaded) => loaded,
        Err(_) => Err(RenderError::Timeout(opts.timeout_ms)),
    };

    page.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Outcome {
        Loaded,
        Fails,
        Hangs,
    }

    struct ScriptedPage {
        outcome: Outcome,
        loads: AtomicUsize,
        closes: AtomicUsize,
    }

    impl ScriptedPage {
        fn new(outcome: Outcome) -> Self {
            Self { outcome, loads: AtomicUsize::new(0), closes: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl PageSession for ScriptedPage {
        async fn load(&self, url: &Url, _settle_timeout: Duration) -> Result<(String, Url), RenderError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Loaded => Ok(("<p>ok</p>".to_string(), url.clone())),
                Outcome::Fails => Err(RenderError::Navigation("net::ERR_NAME_NOT_RESOLVED".into())),
                Outcome::Hangs => std::future::pending().await,
            }
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn url() -> Url {
        Url::parse("https://www.carrier.example.com/discounts").unwrap()
    }

    fn opts() -> RenderOptions {
        RenderOptions { timeout_ms: 2_000, settle_timeout_ms: 500 }
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_after_successful_load() {
        let page = ScriptedPage::new(Outcome::Loaded);

        let (html, final_url) = load_then_close(&page, &url(), &opts()).await.unwrap();

        assert_eq!(html, "<p>ok</p>");
        assert_eq!(final_url, url());
        assert_eq!(page.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_after_failed_load() {
        let page = ScriptedPage::new(Outcome::Fails);

        let result = load_then_close(&page, &url(), &opts()).await;

        assert!(matches!(result, Err(RenderError::Navigation(_))));
        assert_eq!(page.loads.load(Ordering::SeqCst), 1);
        assert_eq!(page.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_after_timeout() {
        let page = ScriptedPage::new(Outcome::Hangs);
        let start = tokio::time::Instant::now();

        let result = load_then_close(&page, &url(), &opts()).await;

        assert!(matches!(result, Err(RenderError::Timeout(2_000))));
        assert!(start.elapsed() >= Duration::from_millis(2_000));
        assert_eq!(page.closes.load(Ordering::SeqCst), 1);
    }
}
