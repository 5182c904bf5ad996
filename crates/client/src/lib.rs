//! Carrier scraping for parcelscope.
//!
//! This crate provides headless browser rendering, selector-based text
//! extraction, and the carrier fetcher that turns pages into payloads.

pub mod carrier;
pub mod extract;
pub mod render;

pub use carrier::{CarrierClient, FetchError, Fetcher};
pub use extract::{ExtractError, parse_selector, select_texts};
#[cfg(feature = "render")]
pub use render::HeadlessRenderer;
pub use render::{PagePool, RenderError, RenderOptions, RenderedPage, Renderer};
