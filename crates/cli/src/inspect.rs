//! Offline view of the durable cache file.

use std::path::Path;

use chrono::{DateTime, Utc};
use parcelscope_core::cache::{CacheStats, try_load};
use parcelscope_core::{Category, Error, ResponsePayload};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub path: String,
    pub exists: bool,
    pub stats: CacheStats,
    pub entries: Vec<EntryRow>,
}

#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub category: Category,
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub fresh: bool,
    pub data: ResponsePayload,
}

/// Load the file at `path` and describe it as of now.
///
/// A missing file reports as an empty cache with `exists: false`.
///
/// # Errors
///
/// `Error::DurableLoadCorrupt` if the file does not parse and `Error::Io` if
/// it cannot be read. The server would silently start empty from such a file.
pub async fn inspect(path: &Path) -> Result<Report, Error> {
    let loaded = try_load(path).await?;
    let exists = loaded.is_some();
    let store = loaded.unwrap_or_default();
    let now = Utc::now();

    let mut entries: Vec<EntryRow> = Category::ALL
        .iter()
        .flat_map(|&category| {
            store.entries(category).map(move |(key, entry)| EntryRow {
                category,
                key: key.to_string(),
                timestamp: entry.timestamp,
                fresh: entry.is_valid_at(category.ttl(), now),
                data: entry.data.clone(),
            })
        })
        .collect();
    entries.sort_by(|a, b| (a.category.as_str(), &a.key).cmp(&(b.category.as_str(), &b.key)));

    Ok(Report { path: path.display().to_string(), exists, stats: store.stats_at(now), entries })
}
