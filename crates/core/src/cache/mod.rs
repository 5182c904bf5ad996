//! In-memory TTL cache with JSON file durability.
//!
//! The store holds one sub-mapping per [`Category`]. Entries are stamped on
//! write and judged fresh only while younger than the category TTL:
//!
//! - tracking: 5 minutes
//! - tariff: 60 minutes
//! - discounts: 60 minutes
//!
//! Stale entries are never removed; they are ignored on read and overwritten on
//! the next fetch. Growth is unbounded in the number of distinct keys.
//!
//! Durability is periodic: [`flusher::spawn`] writes the whole store to disk on
//! an interval and once more on shutdown, so a crash loses at most one interval
//! of writes.

pub mod durable;
pub mod flusher;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

pub use crate::Error;
use crate::payload::ResponsePayload;

pub use durable::{flush_to_durable, load_from_durable, try_load};
pub use flusher::Flusher;

/// Query category owning a cache sub-mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tracking,
    Tariff,
    Discounts,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Tracking, Category::Tariff, Category::Discounts];

    /// Singleton key for the discounts sub-mapping.
    pub const DISCOUNTS_KEY: &'static str = "all";

    /// Fixed time-to-live for entries of this category.
    pub fn ttl(self) -> TimeDelta {
        match self {
            Category::Tracking => TimeDelta::minutes(5),
            Category::Tariff | Category::Discounts => TimeDelta::minutes(60),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Tracking => "tracking",
            Category::Tariff => "tariff",
            Category::Discounts => "discounts",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached payload and the instant it was written.
///
/// Timestamps are stored as epoch milliseconds on disk, so they are truncated
/// to millisecond precision on creation to keep flush/load lossless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: ResponsePayload,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    /// Stamp `data` with the current time.
    pub fn new(data: ResponsePayload) -> Self {
        Self { data, timestamp: Utc::now().trunc_subsecs(3) }
    }

    /// Whether the entry is younger than `ttl` right now.
    pub fn is_valid(&self, ttl: TimeDelta) -> bool {
        self.is_valid_at(ttl, Utc::now())
    }

    /// Whether `now - timestamp < ttl`. An entry exactly `ttl` old is stale.
    pub fn is_valid_at(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) < ttl
    }
}

/// The three category sub-mappings, in their on-disk shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStore {
    #[serde(default)]
    pub tracking: HashMap<String, CacheEntry>,
    #[serde(default)]
    pub tariff: HashMap<String, CacheEntry>,
    #[serde(default)]
    pub discounts: HashMap<String, CacheEntry>,
}

impl CacheStore {
    fn map(&self, category: Category) -> &HashMap<String, CacheEntry> {
        match category {
            Category::Tracking => &self.tracking,
            Category::Tariff => &self.tariff,
            Category::Discounts => &self.discounts,
        }
    }

    fn map_mut(&mut self, category: Category) -> &mut HashMap<String, CacheEntry> {
        match category {
            Category::Tracking => &mut self.tracking,
            Category::Tariff => &mut self.tariff,
            Category::Discounts => &mut self.discounts,
        }
    }

    /// Look up an entry regardless of freshness.
    pub fn get(&self, category: Category, key: &str) -> Option<&CacheEntry> {
        self.map(category).get(key)
    }

    /// Look up an entry only if it is still within the category TTL.
    pub fn get_fresh(&self, category: Category, key: &str) -> Option<&CacheEntry> {
        self.get(category, key)
            .filter(|entry| entry.is_valid(category.ttl()))
    }

    /// Overwrite the entry for `key` with `data` stamped now.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadMismatch` if `data` was not produced by `category`.
    pub fn put(&mut self, category: Category, key: &str, data: ResponsePayload) -> Result<(), Error> {
        if data.category() != Some(category) {
            return Err(Error::PayloadMismatch { expected: category.as_str(), found: data.kind() });
        }
        self.map_mut(category)
            .insert(key.to_string(), CacheEntry::new(data));
        Ok(())
    }

    /// Entries of one category, in no particular order.
    pub fn entries(&self, category: Category) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.map(category)
            .iter()
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.map(*c).is_empty())
    }

    /// Per-category entry counts as of `now`.
    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let count = |category: Category| {
            let map = self.map(category);
            let fresh = map
                .values()
                .filter(|e| e.is_valid_at(category.ttl(), now))
                .count();
            CategoryStats { entries: map.len(), fresh }
        };

        CacheStats {
            tracking: count(Category::Tracking),
            tariff: count(Category::Tariff),
            discounts: count(Category::Discounts),
        }
    }
}

/// Entry counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CategoryStats {
    /// Total entries, fresh or stale.
    pub entries: usize,
    /// Entries still within the category TTL.
    pub fresh: usize,
}

/// Entry counts for the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheStats {
    pub tracking: CategoryStats,
    pub tariff: CategoryStats,
    pub discounts: CategoryStats,
}

/// Shared handle to the process-wide cache store.
///
/// Cloning is cheap; all clones see the same store. Mutations take a short
/// write lock and never await while holding it.
#[derive(Clone, Debug)]
pub struct Cache {
    store: Arc<RwLock<CacheStore>>,
    path: PathBuf,
}

impl Cache {
    /// Load the store from `path`, falling back to an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let store = load_from_durable(&path).await;
        tracing::info!(
            path = %path.display(),
            tracking = store.tracking.len(),
            tariff = store.tariff.len(),
            discounts = store.discounts.len(),
            "cache loaded"
        );
        Self::with_store(store, path)
    }

    /// Wrap an existing store that flushes to `path`.
    pub fn with_store(store: CacheStore, path: impl Into<PathBuf>) -> Self {
        Self { store: Arc::new(RwLock::new(store)), path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone of the entry for `key`, fresh or not.
    pub fn get(&self, category: Category, key: &str) -> Option<CacheEntry> {
        self.read(|store| store.get(category, key).cloned())
    }

    /// Clone of the entry for `key` if it is still fresh.
    pub fn get_fresh(&self, category: Category, key: &str) -> Option<CacheEntry> {
        self.read(|store| store.get_fresh(category, key).cloned())
    }

    /// Overwrite the entry for `key` with `data` stamped now.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadMismatch` if `data` was not produced by `category`.
    pub fn put(&self, category: Category, key: &str, data: ResponsePayload) -> Result<(), Error> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.put(category, key, data)
    }

    /// Point-in-time copy of the whole store.
    pub fn snapshot(&self) -> CacheStore {
        self.read(CacheStore::clone)
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        self.read(|store| store.stats_at(now))
    }

    /// Write a snapshot of the store to the durable file.
    pub async fn flush(&self) -> Result<(), Error> {
        let snapshot = self.snapshot();
        flush_to_durable(&snapshot, &self.path).await
    }

    fn read<T>(&self, f: impl FnOnce(&CacheStore) -> T) -> T {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking(number: &str, status: &str) -> ResponsePayload {
        ResponsePayload::Tracking { tracking_number: number.into(), status: status.into() }
    }

    #[test]
    fn test_ttls() {
        assert_eq!(Category::Tracking.ttl(), TimeDelta::minutes(5));
        assert_eq!(Category::Tariff.ttl(), TimeDelta::minutes(60));
        assert_eq!(Category::Discounts.ttl(), TimeDelta::minutes(60));
    }

    #[test]
    fn test_is_valid_boundary() {
        let entry = CacheEntry::new(tracking("LX1", "Delivered"));
        let ttl = Category::Tracking.ttl();

        assert!(entry.is_valid_at(ttl, entry.timestamp));
        assert!(entry.is_valid_at(ttl, entry.timestamp + ttl - TimeDelta::milliseconds(1)));
        assert!(!entry.is_valid_at(ttl, entry.timestamp + ttl));
        assert!(!entry.is_valid_at(ttl, entry.timestamp + ttl + TimeDelta::seconds(1)));
    }

    #[test]
    fn test_put_then_get() {
        let mut store = CacheStore::default();
        store
            .put(Category::Tracking, "LX1", tracking("LX1", "In transit"))
            .unwrap();

        let entry = store.get(Category::Tracking, "LX1").unwrap();
        assert_eq!(entry.data, tracking("LX1", "In transit"));
        assert!(store.get(Category::Tariff, "LX1").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = CacheStore::default();
        store
            .put(Category::Tracking, "LX1", tracking("LX1", "In transit"))
            .unwrap();
        store
            .put(Category::Tracking, "LX1", tracking("LX1", "Delivered"))
            .unwrap();

        assert_eq!(store.tracking.len(), 1);
        assert_eq!(store.get(Category::Tracking, "LX1").unwrap().data, tracking("LX1", "Delivered"));
    }

    #[test]
    fn test_put_rejects_mismatched_payload() {
        let mut store = CacheStore::default();
        let result = store.put(Category::Tariff, "hk", tracking("LX1", "x"));
        assert!(matches!(result, Err(Error::PayloadMismatch { expected: "tariff", found: "tracking" })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_fresh_ignores_stale() {
        let mut store = CacheStore::default();
        let stale = CacheEntry {
            data: tracking("LX1", "Old"),
            timestamp: Utc::now() - Category::Tracking.ttl() - TimeDelta::seconds(1),
        };
        store.tracking.insert("LX1".into(), stale);

        assert!(store.get(Category::Tracking, "LX1").is_some());
        assert!(store.get_fresh(Category::Tracking, "LX1").is_none());
    }

    #[test]
    fn test_stats() {
        let mut store = CacheStore::default();
        store
            .put(Category::Tracking, "LX1", tracking("LX1", "a"))
            .unwrap();
        store.tracking.insert(
            "LX2".into(),
            CacheEntry { data: tracking("LX2", "b"), timestamp: Utc::now() - TimeDelta::hours(1) },
        );

        let stats = store.stats_at(Utc::now());
        assert_eq!(stats.tracking, CategoryStats { entries: 2, fresh: 1 });
        assert_eq!(stats.tariff, CategoryStats::default());
    }

    #[test]
    fn test_shared_handle_read_your_write() {
        let cache = Cache::with_store(CacheStore::default(), "unused.json");
        let other = cache.clone();

        cache
            .put(Category::Discounts, Category::DISCOUNTS_KEY, ResponsePayload::Discounts { offers: vec!["US: 10%".into()] })
            .unwrap();

        let entry = other
            .get_fresh(Category::Discounts, Category::DISCOUNTS_KEY)
            .unwrap();
        assert_eq!(entry.data, ResponsePayload::Discounts { offers: vec!["US: 10%".into()] });
    }
}
