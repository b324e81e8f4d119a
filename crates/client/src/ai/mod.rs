//! AI recipe extraction from free text.
//!
//! The model is an external capability behind [`RecipeExtractor`], so the
//! pipeline can run against [`FakeRecipeExtractor`] in tests.

pub mod fake;
mod normalize;
pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use ladle_core::{Error, Recipe};

pub use fake::{FakeCall, FakeRecipeExtractor};
pub use openai::{OpenAiConfig, OpenAiRecipeExtractor};

/// Turns mined page text into a [`Recipe`].
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    /// Extract a recipe from `text`. `source_url` is passed to the model as
    /// context and becomes the default provenance.
    async fn extract_from_text(&self, text: &str, source_url: Option<&str>) -> Result<Recipe, Error>;
}
