//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, CarrierConfig, TRACKING_PLACEHOLDER};
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value_ms: u64) -> Result<(), ConfigError> {
    if value_ms < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value_ms > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `flush_interval_secs` is 0 or exceeds one day
    /// - `max_pages` is 0 or exceeds 64
    /// - any timeout is less than 100ms or exceeds 5 minutes
    /// - a carrier URL or selector is malformed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_interval_secs == 0 {
            return Err(invalid("flush_interval_secs", "must be greater than 0"));
        }
        if self.flush_interval_secs > 86_400 {
            return Err(invalid("flush_interval_secs", "must not exceed one day (86400s)"));
        }

        if self.max_pages == 0 {
            return Err(invalid("max_pages", "must be greater than 0"));
        }
        if self.max_pages > 64 {
            return Err(invalid("max_pages", "must not exceed 64"));
        }

        check_timeout("page_acquire_timeout_ms", self.page_acquire_timeout_ms)?;
        check_timeout("render_timeout_ms", self.render_timeout_ms)?;
        check_timeout("settle_timeout_ms", self.settle_timeout_ms)?;

        if self.settle_timeout_ms > self.render_timeout_ms {
            tracing::warn!(
                settle_timeout_ms = self.settle_timeout_ms,
                render_timeout_ms = self.render_timeout_ms,
                "settle_timeout_ms exceeds render_timeout_ms; renders will time out before the network settles"
            );
        }

        self.carrier.validate()
    }
}

impl CarrierConfig {
    /// Validate carrier URLs and selectors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a URL does not parse, the tracking
    /// template lacks `{trackingNumber}`, or a selector is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tracking_url.contains(TRACKING_PLACEHOLDER) {
            return Err(invalid("carrier.tracking_url", format!("must contain {TRACKING_PLACEHOLDER}")));
        }

        let urls = [
            ("carrier.tracking_url", self.tracking_url.replace(TRACKING_PLACEHOLDER, "0")),
            ("carrier.tariff_url", self.tariff_url.clone()),
            ("carrier.discounts_url", self.discounts_url.clone()),
        ];
        for (field, url) in urls {
            Url::parse(&url).map_err(|e| invalid(field, e.to_string()))?;
        }

        let selectors = [
            ("carrier.tracking_selector", &self.tracking_selector),
            ("carrier.tariff_selector", &self.tariff_selector),
            ("carrier.discounts_selector", &self.discounts_selector),
        ];
        for (field, selector) in selectors {
            if selector.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        Ok(())
    }
}
