//! Unified error types for parcelscope.
//!
//! The fetch path never surfaces these to callers; they cover input
//! validation at the request edge and durable cache I/O.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the parcelscope server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or empty required field (e.g., no tracking number).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A payload was stored under a category that did not produce it.
    #[error("PAYLOAD_MISMATCH: expected {expected} payload, got {found}")]
    PayloadMismatch { expected: &'static str, found: &'static str },

    /// The durable cache file exists but could not be parsed.
    #[error("CACHE_CORRUPT: {0}")]
    DurableLoadCorrupt(String),

    /// Reading or writing the durable cache file failed.
    #[error("CACHE_IO: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the cache store failed.
    #[error("CACHE_SERIALIZE: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::PayloadMismatch { .. } => (-32000, err.to_string()),
            Error::DurableLoadCorrupt(msg) => (-32001, msg.clone()),
            Error::Io(e) => (-32002, e.to_string()),
            Error::Serialization(e) => (-32002, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
