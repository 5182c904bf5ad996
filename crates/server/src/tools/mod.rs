//! MCP tool implementations.
//!
//! This module contains all tools exposed by the parcelscope MCP transport.
//! Each tool returns the same payload JSON as the matching HTTP route.

pub mod discounts;
pub mod kb;
pub mod tariff;
pub mod track;

pub use discounts::discounts_impl;
pub use kb::{KbParams, kb_impl};
pub use tariff::{TariffParams, tariff_impl};
pub use track::{TrackParams, track_impl};

use parcelscope_core::{Error, ResponsePayload};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};

/// Wrap a payload as pretty JSON text content.
pub(crate) fn payload_result(payload: &ResponsePayload) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(payload).map_err(Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn result_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
