//! MCP server handler implementation.
//!
//! This module defines the stdio server handler that
//! routes tool calls to the shared query service.
use std::sync::Arc;

use crate::service::QueryService;
use crate::tools::{
    KbParams, TariffParams, TrackParams, discounts_impl, kb_impl, tariff_impl, track_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for parcelscope.
#[derive(Clone)]
pub struct ParcelScopeServer {
    tool_router: ToolRouter<Self>,
    service: Arc<QueryService>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ParcelScopeServer {
    /// Create a new server handler.
    pub fn new(service: Arc<QueryService>) -> Self {
        Self { tool_router: Self::tool_router(), service }
    }

    #[tool(description = "Look up the current status of a package by tracking number.")]
    async fn track_package(&self, params: Parameters<TrackParams>) -> Result<CallToolResult, McpError> {
        track_impl(&self.service, params.0).await
    }

    #[tool(description = "Look up the carrier's tariff information for a destination country.")]
    async fn tariff_lookup(&self, params: Parameters<TariffParams>) -> Result<CallToolResult, McpError> {
        tariff_impl(&self.service, params.0).await
    }

    #[tool(description = "List the carrier's current shipping discounts.")]
    async fn list_discounts(&self) -> Result<CallToolResult, McpError> {
        discounts_impl(&self.service).await
    }

    #[tool(description = "Answer a common shipping question from the knowledge base.")]
    async fn kb_answer(&self, params: Parameters<KbParams>) -> Result<CallToolResult, McpError> {
        kb_impl(&self.service, params.0)
    }
}

impl ServerHandler for ParcelScopeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "parcelscope".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
