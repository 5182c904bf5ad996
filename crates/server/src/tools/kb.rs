//! kb_answer tool implementation.
//!
//! Answers common shipping questions from the canned knowledge base.
//! No network requests are made.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::payload_result;
use crate::service::QueryService;

/// Parameters for the kb_answer tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KbParams {
    /// The customer's question in plain language.
    pub question: String,
}

/// Implementation of the kb_answer tool.
pub fn kb_impl(service: &QueryService, params: KbParams) -> Result<CallToolResult, McpError> {
    let payload = service.kb(&params.question)?;
    payload_result(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::service;
    use crate::tools::result_json;
    use parcelscope_core::kb::{NO_ANSWER, lookup};

    #[test]
    fn test_kb_impl() {
        let (service, _) = service();
        let result = kb_impl(&service, KbParams { question: "What is the shipping time?".into() }).unwrap();

        let json = result_json(&result);
        assert_eq!(json["type"], "kb");
        assert_eq!(json["answer"].as_str(), lookup("shipping time"));
    }

    #[test]
    fn test_kb_impl_unmatched() {
        let (service, _) = service();
        let result = kb_impl(&service, KbParams { question: "Do you sell stamps?".into() }).unwrap();
        assert_eq!(result_json(&result)["answer"], NO_ANSWER);
    }
}
