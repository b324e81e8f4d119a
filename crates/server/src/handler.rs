//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`], all of
//! which share one [`RecipeService`].

use std::sync::Arc;

use ladle_client::RecipeService;
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

use crate::tools::{
    RecipeExtractParams, RecipeGetParams, RecipeListParams, RecipeResolveParams, extract::extract_impl, get::get_impl,
    list::list_impl, resolve::resolve_impl,
};

/// The MCP server handler for ladle.
#[derive(Clone)]
pub struct LadleServer {
    service: Arc<RecipeService>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl LadleServer {
    pub fn new(service: Arc<RecipeService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Extract a structured recipe from a recipe page, blog post, or social video URL. Follows links to dedicated recipe pages when the input points at one, stores the result, and returns its id."
    )]
    async fn recipe_extract(&self, params: Parameters<RecipeExtractParams>) -> Result<CallToolResult, McpError> {
        extract_impl(&self.service, params.0).await
    }

    #[tool(description = "Get a stored recipe record by id, including the full recipe and the page text it was extracted from.")]
    async fn recipe_get(&self, params: Parameters<RecipeGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.service, params.0).await
    }

    /// Diagnostic: explains why a link was or was not followed.
    #[tool(
        description = "Resolve a URL without extracting: returns the platform, candidate links found on the page, and which one (if any) would be followed. Nothing is stored."
    )]
    async fn recipe_resolve(&self, params: Parameters<RecipeResolveParams>) -> Result<CallToolResult, McpError> {
        resolve_impl(&self.service, params.0).await
    }

    #[tool(description = "List recently stored recipes, newest first.")]
    async fn recipe_list(&self, params: Parameters<RecipeListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.service, params.0).await
    }
}

impl ServerHandler for LadleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "ladle".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Use recipe_extract to turn a recipe link into a stored recipe, then recipe_get to read it.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
