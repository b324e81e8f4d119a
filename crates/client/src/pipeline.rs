//! End-to-end extraction for one input URL.
//!
//! resolve -> fetch target -> JSON-LD -> (mine text -> model)
//!
//! Resolution and target extraction fetch independently, even when the
//! target is the input page itself.

use serde::Serialize;
use std::sync::Arc;

use ladle_core::{Error, Recipe, ResolveResult, SourceType};

use crate::ai::RecipeExtractor;
use crate::extract::{html_to_text, parse_structured_recipe, video_page_text};
use crate::fetch::PageFetcher;
use crate::platform::{classify, page_url_for};
use crate::resolve::{ResolverConfig, SourceResolver};

/// Result of one pipeline run, ready to persist.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub input_url: String,
    pub resolved_url: Option<String>,
    pub resolution: ResolveResult,
    pub recipe: Recipe,
    /// Text mined from the target page, kept as evidence.
    pub raw_text: String,
    pub source_type: SourceType,
}

/// Plain text for the target page: mined description on video hosts,
/// generic page text elsewhere.
pub fn mine_page_text(target_url: &str, html: &str) -> String {
    if classify(target_url).is_video_host() { video_page_text(html) } else { html_to_text(html) }
}

pub struct RecipePipeline {
    fetcher: Arc<dyn PageFetcher>,
    resolver: SourceResolver,
    extractor: Arc<dyn RecipeExtractor>,
}

impl RecipePipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: Arc<dyn RecipeExtractor>, config: ResolverConfig) -> Self {
        let resolver = SourceResolver::new(Arc::clone(&fetcher), config);
        Self { fetcher, resolver, extractor }
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Run the full pipeline. Fetch and model errors propagate unchanged.
    pub async fn run(&self, input_url: &str) -> Result<Extraction, Error> {
        let resolution = self.resolver.resolve(input_url).await?;
        if resolution.needs_manual_link {
            tracing::info!(url = input_url, "page points at an out-of-band link; extracting from the page itself");
        }

        let target = resolution.resolved_recipe_url.clone().unwrap_or_else(|| input_url.to_string());
        let html = self.fetcher.fetch_html(&page_url_for(&target)).await?;
        let raw_text = mine_page_text(&target, &html);

        let (recipe, source_type) = match parse_structured_recipe(&html, &target) {
            Some(recipe) => (recipe, SourceType::PageScrape),
            None => {
                tracing::debug!(url = %target, chars = raw_text.chars().count(), "no structured recipe; using model");
                let recipe = self.extractor.extract_from_text(&raw_text, Some(&target)).await?;
                (recipe, SourceType::PageTextAi)
            }
        };

        tracing::debug!(url = input_url, target = %target, source_type = %source_type, "extraction complete");

        Ok(Extraction {
            input_url: input_url.to_string(),
            resolved_url: resolution.resolved_recipe_url.clone(),
            resolution,
            recipe,
            raw_text,
            source_type,
        })
    }
}
