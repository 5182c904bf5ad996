//! track_package tool implementation.
//!
//! Looks up the current status of a package, served from cache for 5 minutes.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::payload_result;
use crate::service::QueryService;

/// Parameters for the track_package tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackParams {
    /// The carrier tracking number.
    pub tracking_number: String,
}

/// Implementation of the track_package tool.
pub async fn track_impl(service: &QueryService, params: TrackParams) -> Result<CallToolResult, McpError> {
    let payload = service.track(&params.tracking_number).await?;
    payload_result(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use crate::tools::result_json;

    #[tokio::test]
    async fn test_track_impl() {
        let (service, fetcher) = service();
        let params = TrackParams { tracking_number: "LX123".into() };

        let result = track_impl(&service, params.clone()).await.unwrap();
        let json = result_json(&result);
        assert_eq!(json["type"], "tracking");
        assert_eq!(json["trackingNumber"], "LX123");

        track_impl(&service, params).await.unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_track_impl_blank() {
        let (service, _) = service();
        let result = track_impl(&service, TrackParams { tracking_number: " ".into() }).await;
        assert_eq!(result.unwrap_err().code.0, -32602);
    }
}
