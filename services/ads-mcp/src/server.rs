//! MCP service exposing the Graph API tools
//!
//! The rmcp SDK owns framing, the initialize handshake, `ping` and
//! notifications. A tool that fails still produces a successful result whose
//! body carries `isError: true`; an unknown tool or bad arguments is an
//! invalid-params protocol error.

use std::future::Future;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use tracing::{info, warn};

use graph_api::GraphTools;

use crate::catalog;
use crate::dispatch::{DispatchError, call_tool};

pub const SERVER_NAME: &str = "meta-ads-mcp";

const INSTRUCTIONS: &str = "Read-only access to the Facebook Marketing API. \
Ids of ad accounts take the form act_<ID>; list endpoints return a paging \
object whose next link can be passed to fetch_pagination_url.";

pub struct AdsServer {
    tools: GraphTools,
}

impl AdsServer {
    pub fn new(tools: GraphTools) -> Self {
        Self { tools }
    }

    /// Run one tool and wrap the Graph API body as pretty-printed text.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match call_tool(&self.tools, name, arguments.map(Value::Object)).await {
            Ok(body) => {
                info!(tool = %name, "tool call succeeded");
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(DispatchError::Tool(e)) => {
                warn!(tool = %name, error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "rejected tool call");
                Err(McpError::invalid_params(e.to_string(), None))
            }
        }
    }
}

impl ServerHandler for AdsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move { Ok(ListToolsResult::with_all_items(catalog::tools())) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.call(&request.name, request.arguments).await }
    }
}
