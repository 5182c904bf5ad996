//! Core types and shared functionality for parcelscope.
//!
//! This crate provides:
//! - Persistent TTL cache with JSON file durability
//! - Response payloads and query identities
//! - The canned knowledge base
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod kb;
pub mod payload;

pub use cache::{Cache, CacheEntry, CacheStore, Category};
pub use config::{AppConfig, CarrierConfig, Transport};
pub use error::Error;
pub use payload::{Query, ResponsePayload};
