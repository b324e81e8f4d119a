//! recipe_resolve tool implementation.
//!
//! Shows which outbound link (if any) the pipeline would follow for a URL,
//! without fetching the target, calling the model, or storing anything.

use ladle_client::RecipeService;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the recipe_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeResolveParams {
    /// URL to resolve.
    pub url: String,
}

/// Implementation of the recipe_resolve tool.
pub async fn resolve_impl(service: &RecipeService, params: RecipeResolveParams) -> Result<CallToolResult, McpError> {
    let result = service.resolve(&params.url).await?;
    json_result(&result)
}
