//! chromiumoxide-backed renderer.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, NavigateParams, SetLifecycleEventsEnabledParams};
use futures_util::StreamExt;
use parcelscope_core::AppConfig;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use url::Url;

use super::{PagePool, PageSession, RenderError, RenderOptions, RenderedPage, Renderer, load_then_close};

/// Lifecycle event name Chrome emits once the page has had no network
/// activity for 500ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Headless Chrome/Chromium renderer using chromiumoxide.
///
/// One browser is shared by all renders; each render opens its own page,
/// bounded by a [`PagePool`].
pub struct HeadlessRenderer {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    pool: PagePool,
}

impl HeadlessRenderer {
    /// Launch a headless browser instance.
    ///
    /// The browser uses a background task to handle Chrome DevTools Protocol
    /// events. Must complete before any request is served.
    pub async fn launch(config: &AppConfig) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder().window_size(1280, 720);
        if config.browser_no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
            .await
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
            tracing::debug!("browser handler stream ended");
        });

        tracing::info!(max_pages = config.max_pages, "headless browser launched");

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler: Mutex::new(Some(handler)),
            pool: PagePool::new(config.max_pages, config.page_acquire_timeout()),
        })
    }

    /// Close the browser. Renders started afterwards fail with `BrowserClosed`.
    pub async fn close(&self) {
        self.pool.close();

        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!("browser close failed: {e}");
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("waiting for browser exit failed: {e}");
            }
        }

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }

        tracing::info!("headless browser closed");
    }

    async fn open_page(&self) -> Result<Page, RenderError> {
        let browser = self.browser.read().await;
        let browser = browser.as_ref().ok_or(RenderError::BrowserClosed)?;
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))
    }
}

/// The document load started by one navigation.
///
/// Lifecycle events from the `about:blank` document the page was opened on,
/// or from child frames, must not count as the navigated page settling.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NavigationTarget {
    frame_id: String,
    loader_id: String,
}

impl NavigationTarget {
    fn is_network_idle(&self, name: &str, frame_id: &str, loader_id: &str) -> bool {
        name == NETWORK_IDLE && frame_id == self.frame_id && loader_id == self.loader_id
    }
}

#[async_trait::async_trait]
impl PageSession for Page {
    async fn load(&self, url: &Url, settle_timeout: Duration) -> Result<(String, Url), RenderError> {
        self.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        let mut lifecycle = self
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let navigated = self
            .execute(NavigateParams::new(url.as_str()))
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?
            .result;
        if let Some(error_text) = navigated.error_text {
            return Err(RenderError::Navigation(error_text));
        }

        // Same-document navigations start no new load and emit no lifecycle events.
        if let Some(loader_id) = navigated.loader_id {
            let target =
                NavigationTarget { frame_id: navigated.frame_id.inner().clone(), loader_id: loader_id.inner().clone() };

            let settled = tokio::time::timeout(settle_timeout, async {
                while let Some(event) = lifecycle.next().await {
                    if target.is_network_idle(&event.name, event.frame_id.inner(), event.loader_id.inner()) {
                        return true;
                    }
                }
                false
            })
            .await
            .unwrap_or(false);

            if !settled {
                tracing::debug!(url = %url, "network did not settle, extracting current DOM");
            }
        }

        let html = self
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let page_url = self
            .url()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let final_url = page_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .unwrap_or_else(|| url.clone());

        Ok((html, final_url))
    }

    async fn close(&self) {
        if let Err(e) = self.clone().close().await {
            tracing::debug!("page close failed: {e}");
        }
    }
}

#[async_trait::async_trait]
impl Renderer for HeadlessRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let _permit = self.pool.acquire().await?;
        let start = Instant::now();

        let page = self.open_page().await?;
        let (html, final_url) = load_then_close(&page, url, opts).await?;
        let render_time_ms = start.elapsed().as_millis() as u64;

        Ok(RenderedPage { html, final_url, render_time_ms })
    }
}
