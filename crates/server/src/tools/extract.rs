//! recipe_extract tool implementation.
//!
//! Runs the full pipeline on one URL and stores the result.

use ladle_client::RecipeService;
use ladle_core::SourceType;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the recipe_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeExtractParams {
    /// Recipe page, blog post, or social video URL.
    pub url: String,
}

/// Output from the recipe_extract tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeExtractOutput {
    /// Id of the stored record; pass to recipe_get for the full recipe.
    pub id: String,
    pub title: String,
    /// "PAGE_SCRAPE" when the page carried schema.org markup, "PAGE_TEXT_AI" otherwise.
    pub source_type: SourceType,
    /// Outbound recipe page the input pointed at, if one was followed.
    pub resolved_url: Option<String>,
    /// The page points at an out-of-band link ("link in bio") that could not be followed.
    pub needs_manual_link: bool,
}

/// Implementation of the recipe_extract tool.
pub async fn extract_impl(service: &RecipeService, params: RecipeExtractParams) -> Result<CallToolResult, McpError> {
    let stored = service.extract(&params.url).await?;
    let extraction = stored.extraction;

    let output = RecipeExtractOutput {
        id: stored.id,
        title: extraction.recipe.title,
        source_type: extraction.source_type,
        resolved_url: extraction.resolved_url,
        needs_manual_link: extraction.resolution.needs_manual_link,
    };
    json_result(&output)
}
