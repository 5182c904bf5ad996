//! Durable JSON file for the cache store.
//!
//! File layout:
//!
//! ```json
//! {
//!   "tracking":  { "<number>":  { "data": {...}, "timestamp": 1700000000000 } },
//!   "tariff":    { "<country>": { "data": {...}, "timestamp": 1700000000000 } },
//!   "discounts": { "all":       { "data": {...}, "timestamp": 1700000000000 } }
//! }
//! ```
//!
//! There is no schema version; a file that no longer parses is treated as empty.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::CacheStore;
use crate::Error;

/// Load the store from `path`.
///
/// A missing file yields an empty store silently; an unreadable or malformed
/// file yields an empty store with a warning. Never fails.
pub async fn load_from_durable(path: &Path) -> CacheStore {
    match try_load(path).await {
        Ok(Some(store)) => store,
        Ok(None) => {
            tracing::debug!(path = %path.display(), "no cache file, starting empty");
            CacheStore::default()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unusable cache file");
            CacheStore::default()
        }
    }
}

/// Load the store from `path`, distinguishing a missing file from a bad one.
///
/// # Errors
///
/// Returns `Error::Io` if the file exists but cannot be read, or
/// `Error::DurableLoadCorrupt` if its contents are not a valid store.
pub async fn try_load(path: &Path) -> Result<Option<CacheStore>, Error> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| Error::DurableLoadCorrupt(e.to_string()))
}

/// Serialize the whole store over `path`.
///
/// The JSON is written to a sibling temporary file and renamed into place, so
/// readers see either the previous or the new contents.
pub async fn flush_to_durable(store: &CacheStore, path: &Path) -> Result<(), Error> {
    let json = serde_json::to_vec_pretty(store)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "cache flushed");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
