//! Query handling shared by the HTTP and MCP transports.
//!
//! A cacheable query is served from the cache while its entry is fresh;
//! otherwise the fetcher runs and its result, fallback or not, overwrites the
//! entry. Concurrent misses for the same key each fetch; the last write wins.

use std::sync::Arc;

use parcelscope_client::Fetcher;
use parcelscope_core::cache::CacheStats;
use parcelscope_core::{Cache, Error, Query, ResponsePayload, kb};

/// Cache-fronted access to the carrier fetcher and the knowledge base.
pub struct QueryService {
    cache: Cache,
    fetcher: Arc<dyn Fetcher>,
}

impl QueryService {
    pub fn new(cache: Cache, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Serve `query` from a fresh cache entry, or fetch and store it.
    pub async fn resolve(&self, query: Query) -> ResponsePayload {
        let category = query.category();
        let key = query.key();

        if let Some(entry) = self.cache.get_fresh(category, key) {
            tracing::debug!(%category, key, "cache hit");
            return entry.data;
        }

        tracing::debug!(%category, key, "cache miss");
        let payload = self.fetcher.fetch(&query).await;

        if let Err(e) = self.cache.put(category, key, payload.clone()) {
            tracing::error!(%category, key, error = %e, "refusing to cache payload");
        }

        payload
    }

    /// # Errors
    ///
    /// `Error::InvalidInput` if the tracking number is blank.
    pub async fn track(&self, tracking_number: &str) -> Result<ResponsePayload, Error> {
        let tracking_number = required("trackingNumber", tracking_number)?;
        Ok(self.resolve(Query::Tracking(tracking_number.to_string())).await)
    }

    /// # Errors
    ///
    /// `Error::InvalidInput` if the country is blank.
    pub async fn tariff(&self, country: &str) -> Result<ResponsePayload, Error> {
        let country = required("country", country)?;
        Ok(self.resolve(Query::Tariff(country.to_string())).await)
    }

    pub async fn discounts(&self) -> ResponsePayload {
        self.resolve(Query::Discounts).await
    }

    /// KB answers are computed, never cached.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if the question is blank.
    pub fn kb(&self, question: &str) -> Result<ResponsePayload, Error> {
        let question = required("question", question)?;
        Ok(kb::answer(question))
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    Ok(value)
}
