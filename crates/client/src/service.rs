//! Caller-facing operations: extract-and-store, read back, resolve, list.

use std::sync::Arc;

use ladle_core::{AppConfig, Error, NewRecipeRecord, RecipeDb, RecipeRecord, RecipeSummary, ResolveResult};

use crate::ai::{OpenAiConfig, OpenAiRecipeExtractor, RecipeExtractor};
use crate::fetch::{FetchClient, FetchConfig, PageFetcher, canonicalize};
use crate::pipeline::{Extraction, RecipePipeline};
use crate::resolve::ResolverConfig;

/// Largest page size accepted by [`RecipeService::list`].
pub const MAX_LIST_LIMIT: usize = 100;

/// A persisted pipeline result.
#[derive(Debug, Clone)]
pub struct StoredExtraction {
    pub id: String,
    pub extraction: Extraction,
}

/// Pipeline plus record store.
pub struct RecipeService {
    pipeline: RecipePipeline,
    db: RecipeDb,
}

/// Trim and canonicalize caller input, rejecting it before any network call.
fn validate_url(url: &str) -> Result<String, Error> {
    Ok(canonicalize(url)?.to_string())
}

impl RecipeService {
    pub fn new(pipeline: RecipePipeline, db: RecipeDb) -> Self {
        Self { pipeline, db }
    }

    /// Wire the live fetcher and model client from configuration.
    pub fn from_config(config: &AppConfig, db: RecipeDb) -> Result<Self, Error> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FetchClient::new(FetchConfig::from(config))?);
        let extractor: Arc<dyn RecipeExtractor> = Arc::new(OpenAiRecipeExtractor::new(OpenAiConfig::from(config))?);
        let pipeline = RecipePipeline::new(fetcher, extractor, ResolverConfig::from(config));
        Ok(Self::new(pipeline, db))
    }

    /// Run the pipeline on `url` and persist the result.
    ///
    /// Nothing is written unless the whole pipeline succeeds.
    pub async fn extract(&self, url: &str) -> Result<StoredExtraction, Error> {
        let url = validate_url(url)?;
        let extraction = self.pipeline.run(&url).await?;

        let id = self
            .db
            .create(NewRecipeRecord {
                input_url: extraction.input_url.clone(),
                resolved_url: extraction.resolved_url.clone(),
                source_type: extraction.source_type,
                recipe: extraction.recipe.clone(),
                raw_text: extraction.raw_text.clone(),
            })
            .await?;

        tracing::info!(id = %id, url = %url, source_type = %extraction.source_type, "stored recipe");
        Ok(StoredExtraction { id, extraction })
    }

    /// Read a stored record.
    pub async fn get_recipe(&self, id: &str) -> Result<RecipeRecord, Error> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("empty recipe id".to_string()));
        }
        self.db
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no recipe with id {id}")))
    }

    /// Resolution only: no target fetch, no model call, no persistence.
    pub async fn resolve(&self, url: &str) -> Result<ResolveResult, Error> {
        let url = validate_url(url)?;
        self.pipeline.resolver().resolve(&url).await
    }

    /// Newest records first, `limit` clamped to `1..=MAX_LIST_LIMIT`.
    pub async fn list(&self, limit: usize) -> Result<Vec<RecipeSummary>, Error> {
        self.db.list_recent(limit.clamp(1, MAX_LIST_LIMIT)).await
    }
}
