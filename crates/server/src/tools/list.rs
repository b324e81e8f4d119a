//! recipe_list tool implementation.

use ladle_client::RecipeService;
use ladle_core::RecipeSummary;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

fn default_limit() -> usize {
    20
}

/// Parameters for the recipe_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeListParams {
    /// Maximum number of records, newest first (default: 20, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Output from the recipe_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeListOutput {
    pub recipes: Vec<RecipeSummary>,
}

/// Implementation of the recipe_list tool.
pub async fn list_impl(service: &RecipeService, params: RecipeListParams) -> Result<CallToolResult, McpError> {
    let recipes = service.list(params.limit).await?;
    json_result(&RecipeListOutput { recipes })
}
