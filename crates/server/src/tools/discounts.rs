//! list_discounts tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::payload_result;
use crate::service::QueryService;

/// Implementation of the list_discounts tool.
pub async fn discounts_impl(service: &QueryService) -> Result<CallToolResult, McpError> {
    payload_result(&service.discounts().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use crate::tools::result_json;

    #[tokio::test]
    async fn test_discounts_impl_uses_cache() {
        let (service, fetcher) = service();

        let first = result_json(&discounts_impl(&service).await.unwrap());
        let second = result_json(&discounts_impl(&service).await.unwrap());

        assert_eq!(first["offers"], serde_json::json!(["US: 1%"]));
        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }
}
