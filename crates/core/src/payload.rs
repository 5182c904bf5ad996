//! Response envelopes and query identities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::Category;

/// Normalized result of a query, serialized with a `type` tag.
///
/// ```json
/// {"type": "tracking", "trackingNumber": "LX123", "status": "Delivered"}
/// {"type": "tariff", "country": "hk", "info": "Hong Kong HKD rates..."}
/// {"type": "discounts", "offers": ["US: 10%"]}
/// {"type": "kb", "question": "...", "answer": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponsePayload {
    #[serde(rename_all = "camelCase")]
    Tracking { tracking_number: String, status: String },
    Tariff { country: String, info: String },
    Discounts { offers: Vec<String> },
    Kb { question: String, answer: String },
}

impl ResponsePayload {
    /// The `type` tag this payload serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponsePayload::Tracking { .. } => "tracking",
            ResponsePayload::Tariff { .. } => "tariff",
            ResponsePayload::Discounts { .. } => "discounts",
            ResponsePayload::Kb { .. } => "kb",
        }
    }

    /// The cache category this payload belongs to. KB answers are never cached.
    pub fn category(&self) -> Option<Category> {
        match self {
            ResponsePayload::Tracking { .. } => Some(Category::Tracking),
            ResponsePayload::Tariff { .. } => Some(Category::Tariff),
            ResponsePayload::Discounts { .. } => Some(Category::Discounts),
            ResponsePayload::Kb { .. } => None,
        }
    }
}

/// A cacheable query: the category plus its category-specific key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    Tracking(String),
    Tariff(String),
    Discounts,
}

impl Query {
    pub fn category(&self) -> Category {
        match self {
            Query::Tracking(_) => Category::Tracking,
            Query::Tariff(_) => Category::Tariff,
            Query::Discounts => Category::Discounts,
        }
    }

    /// Key within the category's sub-mapping.
    pub fn key(&self) -> &str {
        match self {
            Query::Tracking(number) => number,
            Query::Tariff(country) => country,
            Query::Discounts => Category::DISCOUNTS_KEY,
        }
    }
}
