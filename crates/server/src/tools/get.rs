//! recipe_get tool implementation.

use ladle_client::RecipeService;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the recipe_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeGetParams {
    /// Id returned by recipe_extract.
    pub id: String,
}

/// Implementation of the recipe_get tool. Answers with the full stored record.
pub async fn get_impl(service: &RecipeService, params: RecipeGetParams) -> Result<CallToolResult, McpError> {
    let record = service.get_recipe(&params.id).await?;
    json_result(&record)
}
