//! Text extraction from rendered HTML using CSS selectors.
//!
//! Element text is the concatenation of its descendant text nodes with runs of
//! whitespace collapsed to a single space and the ends trimmed, which is close
//! to what a browser reports as `innerText` for table rows and list items.

use scraper::{Html, Selector};
use thiserror::Error;

/// Errors from selector-based extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The selector did not parse.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Text of every element matching `selector`, in document order.
///
/// Matching elements with no text yield empty strings; no match at all yields
/// an empty vector.
pub fn select_texts(html: &str, selector: &str) -> Result<Vec<String>, ExtractError> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&parsed)
        .map(|element| collapse_whitespace(element.text()))
        .collect())
}

/// Parse a CSS selector, reporting the offending text on failure.
pub fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector)
        .map_err(|e| ExtractError::InvalidSelector { selector: selector.to_string(), reason: format!("{e:?}") })
}

/// Join text fragments, collapsing whitespace runs to single spaces.
pub fn collapse_whitespace<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in fragments.into_iter().flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
