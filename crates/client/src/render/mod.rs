//! Headless browser rendering for the carrier's JS-heavy pages.
//!
//! This module provides the renderer trait, a bounded page pool, and a
//! feature-gated implementation using chromiumoxide for headless
//! Chrome/Chromium browser control.
//!
//! Every render owns one isolated page for its whole duration. The page is
//! closed before `render` returns, whether navigation succeeded or not.

pub mod pool;
pub mod session;

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;
pub use pool::PagePool;
pub use session::{PageSession, load_then_close};

use std::time::Duration;

use parcelscope_core::AppConfig;
use thiserror::Error;
use url::Url;

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to open a page or navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Timeout waiting for page to load.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// No page became free within the acquire timeout.
    #[error("page pool exhausted: {capacity} pages busy for {waited_ms}ms")]
    PoolExhausted { capacity: usize, waited_ms: u64 },

    /// Browser closed unexpectedly or was shut down.
    #[error("browser closed")]
    BrowserClosed,
}

/// Options for rendering a page.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Upper bound on navigation plus content retrieval (default: 30000).
    pub timeout_ms: u64,

    /// How long to wait for network idle after navigation (default: 10000).
    pub settle_timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { timeout_ms: 30_000, settle_timeout_ms: 10_000 }
    }
}

impl RenderOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { timeout_ms: config.render_timeout_ms, settle_timeout_ms: config.settle_timeout_ms }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Rendered HTML content.
    pub html: String,

    /// Final URL after redirects.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Renderer trait for headless browser page rendering.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render a URL to HTML via headless browser.
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}
