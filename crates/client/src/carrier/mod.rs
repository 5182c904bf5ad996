//! Carrier page scraping with per-category fallbacks.
//!
//! ### Extraction
//! - **tracking**: text of the first element matching the summary selector.
//! - **tariff**: text of every table row; the first row mentioning the country
//!   (case-insensitive) wins.
//! - **discounts**: text of every offer element, trimmed, empties dropped.
//!
//! ### Fallbacks
//! A fetch never fails. Two distinct degradations exist and must stay apart:
//! - *empty result*: the page loaded but had nothing to extract. Tracking
//!   reports [`TRACKING_NOT_FOUND`], tariff reports "No tariff info found",
//!   discounts reports [`NO_DISCOUNTS`].
//! - *fetch error*: the page could not be produced or queried. Tracking and
//!   tariff report a generic error, discounts serves [`STATIC_DISCOUNTS`].

pub mod error;

pub use error::FetchError;

use std::sync::Arc;

use parcelscope_core::config::TRACKING_PLACEHOLDER;
use parcelscope_core::{CarrierConfig, Query, ResponsePayload};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::extract::{ExtractError, parse_selector, select_texts};
use crate::render::{RenderOptions, Renderer};

/// Status when the tracking page has no summary element.
pub const TRACKING_NOT_FOUND: &str = "Could not fetch status";

/// Status when the tracking page could not be scraped.
pub const TRACKING_ERROR: &str = "Error fetching tracking info";

/// Info when the tariff page could not be scraped.
pub const TARIFF_ERROR: &str = "Error fetching tariff info";

/// Offers when the discounts page lists none.
pub const NO_DISCOUNTS: &str = "No current discounts found.";

/// Offers served when the discounts page could not be scraped.
pub const STATIC_DISCOUNTS: [&str; 3] = ["US: 10%", "CA: 8%", "IL: 12%"];

/// Everything except RFC 3986 unreserved characters, so the encoded number is
/// a single opaque component in either a path or a query string.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Anything that can answer a cacheable query.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Produce the payload for `query`. Never fails; errors become fallbacks.
    async fn fetch(&self, query: &Query) -> ResponsePayload;
}

/// Scrapes the carrier's pages through a [`Renderer`].
pub struct CarrierClient {
    renderer: Arc<dyn Renderer>,
    config: CarrierConfig,
    options: RenderOptions,
}

impl CarrierClient {
    /// # Errors
    ///
    /// `ExtractError::InvalidSelector` if any configured selector does not parse,
    /// so a bad selector stops startup instead of failing every fetch.
    pub fn new(
        renderer: Arc<dyn Renderer>, config: CarrierConfig, options: RenderOptions,
    ) -> Result<Self, ExtractError> {
        for selector in [&config.tracking_selector, &config.tariff_selector, &config.discounts_selector] {
            parse_selector(selector)?;
        }
        Ok(Self { renderer, config, options })
    }

    /// Current status of a package.
    pub async fn track(&self, tracking_number: &str) -> ResponsePayload {
        let status = match self.scrape_tracking(tracking_number).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::info!(tracking_number, "no tracking summary on page");
                TRACKING_NOT_FOUND.to_string()
            }
            Err(e) => {
                tracing::warn!(tracking_number, error = %e, "tracking fetch failed");
                TRACKING_ERROR.to_string()
            }
        };

        ResponsePayload::Tracking { tracking_number: tracking_number.to_string(), status }
    }

    /// Tariff information for a country.
    pub async fn tariff(&self, country: &str) -> ResponsePayload {
        let info = match self.scrape_tariff_rows().await {
            Ok(rows) => select_tariff_row(&rows, country)
                .map(str::to_string)
                .unwrap_or_else(|| no_tariff_info(country)),
            Err(e) => {
                tracing::warn!(country, error = %e, "tariff fetch failed");
                TARIFF_ERROR.to_string()
            }
        };

        ResponsePayload::Tariff { country: country.to_string(), info }
    }

    /// Currently advertised discounts.
    pub async fn discounts(&self) -> ResponsePayload {
        let offers = match self.scrape_offers().await {
            Ok(texts) => normalize_offers(texts),
            Err(e) => {
                tracing::warn!(error = %e, "discounts fetch failed, serving static offers");
                STATIC_DISCOUNTS.iter().map(|s| s.to_string()).collect()
            }
        };

        ResponsePayload::Discounts { offers }
    }

    async fn scrape_tracking(&self, tracking_number: &str) -> Result<Option<String>, FetchError> {
        let url = tracking_url(&self.config.tracking_url, tracking_number)?;
        let texts = self.scrape(&url, &self.config.tracking_selector).await?;
        Ok(texts.into_iter().next().filter(|t| !t.is_empty()))
    }

    async fn scrape_tariff_rows(&self) -> Result<Vec<String>, FetchError> {
        let url = Url::parse(&self.config.tariff_url)?;
        self.scrape(&url, &self.config.tariff_selector).await
    }

    async fn scrape_offers(&self) -> Result<Vec<String>, FetchError> {
        let url = Url::parse(&self.config.discounts_url)?;
        self.scrape(&url, &self.config.discounts_selector).await
    }

    async fn scrape(&self, url: &Url, selector: &str) -> Result<Vec<String>, FetchError> {
        let page = self.renderer.render(url, &self.options).await?;
        tracing::debug!(
            url = %url,
            final_url = %page.final_url,
            elapsed_ms = page.render_time_ms,
            "page rendered"
        );
        Ok(select_texts(&page.html, selector)?)
    }
}

#[async_trait::async_trait]
impl Fetcher for CarrierClient {
    async fn fetch(&self, query: &Query) -> ResponsePayload {
        match query {
            Query::Tracking(number) => self.track(number).await,
            Query::Tariff(country) => self.tariff(country).await,
            Query::Discounts => self.discounts().await,
        }
    }
}

/// Substitute the URL-encoded tracking number into `template`.
pub fn tracking_url(template: &str, tracking_number: &str) -> Result<Url, FetchError> {
    let encoded = utf8_percent_encode(tracking_number, COMPONENT).to_string();
    Ok(Url::parse(&template.replace(TRACKING_PLACEHOLDER, &encoded))?)
}

/// First row whose text contains `country`, ignoring case.
pub fn select_tariff_row<'a>(rows: &'a [String], country: &str) -> Option<&'a str> {
    let needle = country.to_lowercase();
    rows.iter()
        .find(|row| row.to_lowercase().contains(&needle))
        .map(String::as_str)
}

pub fn no_tariff_info(country: &str) -> String {
    format!("No tariff info found for {country}")
}

/// Trim offers and drop empties; an empty result becomes [`NO_DISCOUNTS`].
pub fn normalize_offers(texts: Vec<String>) -> Vec<String> {
    let offers: Vec<String> = texts
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if offers.is_empty() { vec![NO_DISCOUNTS.to_string()] } else { offers }
}
