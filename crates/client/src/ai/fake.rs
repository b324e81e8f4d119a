//! Deterministic stand-in for the model service.
//!
//! Returns a fixed recipe (or a fixed failure) and records every call so
//! tests can assert whether the AI path ran.

use async_trait::async_trait;
use std::sync::Mutex;

use ladle_core::{Error, Ingredient, Platform, Recipe, RecipeSource, number_steps};

use super::RecipeExtractor;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCall {
    pub text: String,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone)]
enum Reply {
    Recipe(Recipe),
    Fail(String),
}

#[derive(Debug)]
pub struct FakeRecipeExtractor {
    reply: Reply,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeRecipeExtractor {
    /// Answer every call with `recipe`.
    pub fn returning(recipe: Recipe) -> Self {
        Self { reply: Reply::Recipe(recipe), calls: Mutex::new(Vec::new()) }
    }

    /// Fail every call with `EXTRACTION_FAILED: message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Reply::Fail(message.into()), calls: Mutex::new(Vec::new()) }
    }

    /// A small two-step recipe titled `title`, with no source set.
    pub fn sample_recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            servings: None,
            ingredients: vec![Ingredient::named("noodles"), Ingredient::named("garlic")],
            steps: number_steps([("Boil the noodles.", None), ("Toss with garlic.", Some(2.0))]),
            notes: None,
            cuisine: None,
            meal_type: None,
            tags: None,
            source: RecipeSource { url: None, platform: Platform::Other },
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl Default for FakeRecipeExtractor {
    fn default() -> Self {
        Self::returning(Self::sample_recipe("Fake Recipe"))
    }
}

#[async_trait]
impl RecipeExtractor for FakeRecipeExtractor {
    async fn extract_from_text(&self, text: &str, source_url: Option<&str>) -> Result<Recipe, Error> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(FakeCall { text: text.to_string(), source_url: source_url.map(str::to_string) });
        }

        match &self.reply {
            Reply::Recipe(recipe) => {
                let mut recipe = recipe.clone();
                if recipe.source.url.is_none() {
                    recipe.source.url = source_url.map(str::to_string);
                }
                Ok(recipe)
            }
            Reply::Fail(message) => Err(Error::ExtractionFailed(message.clone())),
        }
    }
}
