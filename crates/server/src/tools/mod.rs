//! MCP tool implementations.
//!
//! Each tool takes its params struct and the shared [`RecipeService`] and
//! answers with pretty-printed JSON text.

pub mod extract;
pub mod get;
pub mod list;
pub mod resolve;

use ladle_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use extract::RecipeExtractParams;
pub use get::RecipeGetParams;
pub use list::RecipeListParams;
pub use resolve::RecipeResolveParams;

/// Serialize `output` as the tool's single text content block.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::Serialization(format!("failed to serialize tool output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
