//! Carrier scrape error types.

use crate::extract::ExtractError;
use crate::render::RenderError;

/// Why a scrape produced no data. Never returned past the fetcher; each
/// variant is logged and replaced with a category fallback.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL built for the page did not parse.
    #[error("invalid carrier URL: {0}")]
    InvalidUrl(String),

    /// The browser could not produce the page.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The rendered page could not be queried.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}
