//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PARCELSCOPE_*)
//! 2. TOML config file (if PARCELSCOPE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Nested carrier settings use a double underscore, e.g.
//! `PARCELSCOPE_CARRIER__TRACKING_URL`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Placeholder substituted with the URL-encoded tracking number.
pub const TRACKING_PLACEHOLDER: &str = "{trackingNumber}";

/// How the server exposes its query handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON over HTTP on `bind_addr`.
    #[default]
    Http,
    /// MCP tools over stdin/stdout.
    Stdio,
}

/// Carrier pages and the selectors used to scrape them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// Tracking page URL template containing `{trackingNumber}`.
    #[serde(default = "default_tracking_url")]
    pub tracking_url: String,

    /// Selector for the tracking summary element.
    #[serde(default = "default_tracking_selector")]
    pub tracking_selector: String,

    /// Tariff table page URL.
    #[serde(default = "default_tariff_url")]
    pub tariff_url: String,

    /// Selector matching each tariff table row.
    #[serde(default = "default_tariff_selector")]
    pub tariff_selector: String,

    /// Discounts page URL.
    #[serde(default = "default_discounts_url")]
    pub discounts_url: String,

    /// Selector matching each offer element.
    #[serde(default = "default_discounts_selector")]
    pub discounts_selector: String,
}

fn default_tracking_url() -> String {
    "https://www.carrier.example.com/track?number={trackingNumber}".into()
}

fn default_tracking_selector() -> String {
    ".tracking-summary".into()
}

fn default_tariff_url() -> String {
    "https://www.carrier.example.com/tariffs".into()
}

fn default_tariff_selector() -> String {
    "table tr".into()
}

fn default_discounts_url() -> String {
    "https://www.carrier.example.com/discounts".into()
}

fn default_discounts_selector() -> String {
    ".discount-offer".into()
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            tracking_url: default_tracking_url(),
            tracking_selector: default_tracking_selector(),
            tariff_url: default_tariff_url(),
            tariff_selector: default_tariff_selector(),
            discounts_url: default_discounts_url(),
            discounts_selector: default_discounts_selector(),
        }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PARCELSCOPE_*)
/// 2. TOML config file (if PARCELSCOPE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the durable JSON cache file.
    ///
    /// Set via PARCELSCOPE_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Seconds between cache flushes.
    ///
    /// Set via PARCELSCOPE_FLUSH_INTERVAL_SECS environment variable.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Address the HTTP transport listens on.
    ///
    /// Set via PARCELSCOPE_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Transport for the query handlers: `http` or `stdio`.
    ///
    /// Set via PARCELSCOPE_TRANSPORT environment variable.
    #[serde(default)]
    pub transport: Transport,

    /// Maximum number of browser pages open at once.
    ///
    /// Set via PARCELSCOPE_MAX_PAGES environment variable.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// How long a fetch waits for a free page before falling back.
    ///
    /// Set via PARCELSCOPE_PAGE_ACQUIRE_TIMEOUT_MS environment variable.
    #[serde(default = "default_page_acquire_timeout_ms")]
    pub page_acquire_timeout_ms: u64,

    /// Upper bound on navigation plus extraction for one page.
    ///
    /// Set via PARCELSCOPE_RENDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// How long to wait for the network to go idle after navigation.
    ///
    /// Set via PARCELSCOPE_SETTLE_TIMEOUT_MS environment variable.
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,

    /// Launch Chrome with `--no-sandbox` (needed in most containers).
    ///
    /// Set via PARCELSCOPE_BROWSER_NO_SANDBOX environment variable.
    #[serde(default)]
    pub browser_no_sandbox: bool,

    /// Explicit Chrome/Chromium executable; auto-detected when unset.
    ///
    /// Set via PARCELSCOPE_CHROME_EXECUTABLE environment variable.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Carrier pages and selectors.
    #[serde(default)]
    pub carrier: CarrierConfig,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./parcelscope-cache.json")
}

fn default_flush_interval_secs() -> u64 {
    60
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_max_pages() -> usize {
    4
}

fn default_page_acquire_timeout_ms() -> u64 {
    10_000
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_settle_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            flush_interval_secs: default_flush_interval_secs(),
            bind_addr: default_bind_addr(),
            transport: Transport::default(),
            max_pages: default_max_pages(),
            page_acquire_timeout_ms: default_page_acquire_timeout_ms(),
            render_timeout_ms: default_render_timeout_ms(),
            settle_timeout_ms: default_settle_timeout_ms(),
            browser_no_sandbox: false,
            chrome_executable: None,
            carrier: CarrierConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    pub fn page_acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.page_acquire_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PARCELSCOPE_`
    /// 2. TOML file from `PARCELSCOPE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PARCELSCOPE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PARCELSCOPE_")
                .ignore(&["CONFIG_FILE", "SERVER"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(&figment)
    }

    /// Extract and validate configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` on extraction errors and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
