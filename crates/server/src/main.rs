//! ladle MCP server entry point.
//!
//! Boots the recipe extraction server on stdio transport. Logging goes to
//! stderr so it never interleaves with JSON-RPC on stdout.

use std::sync::Arc;

use anyhow::Result;
use ladle_client::RecipeService;
use ladle_core::{AppConfig, RecipeDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = RecipeDb::open(&config.db_path).await?;
    let service = RecipeService::from_config(&config, db)?;

    tracing::info!(db_path = %config.db_path.display(), model = %config.openai_model, "starting ladle server on stdio transport");

    let handler = handler::LadleServer::new(Arc::new(service));
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    Ok(())
}
