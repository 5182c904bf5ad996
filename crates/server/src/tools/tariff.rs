//! tariff_lookup tool implementation.
//!
//! Finds the tariff table row for a country, served from cache for 60 minutes.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::payload_result;
use crate::service::QueryService;

/// Parameters for the tariff_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TariffParams {
    /// Country name or code to look for in the tariff table (e.g. "hk").
    pub country: String,
}

/// Implementation of the tariff_lookup tool.
pub async fn tariff_impl(service: &QueryService, params: TariffParams) -> Result<CallToolResult, McpError> {
    let payload = service.tariff(&params.country).await?;
    payload_result(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use crate::tools::result_json;

    #[tokio::test]
    async fn test_tariff_impl() {
        let (service, _) = service();
        let result = tariff_impl(&service, TariffParams { country: "hk".into() }).await.unwrap();

        let json = result_json(&result);
        assert_eq!(json["type"], "tariff");
        assert_eq!(json["country"], "hk");
        assert_eq!(json["info"], "hk rates #1");
    }
}
