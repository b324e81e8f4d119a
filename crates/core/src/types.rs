//! Recipe and resolution records shared by the pipeline, store and server.
//!
//! Both [`Recipe`] and [`ResolveResult`] are built once per extraction request
//! and never mutated after the pipeline hands them on.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Platform a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    #[default]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Other => "other",
        }
    }

    /// Whether pages on this platform embed a client-side state blob worth mining.
    pub fn is_video_host(&self) -> bool {
        matches!(self, Platform::Youtube)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ingredient line. Unknown parts stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    pub item: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

impl Ingredient {
    /// An ingredient known only by name.
    pub fn named(item: impl Into<String>) -> Self {
        Self { item: item.into(), quantity: None, unit: None, notes: None }
    }
}

/// One instruction step. `order` is 1-based and matches list position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub order: u32,
    pub instruction: String,
    #[serde(default)]
    pub time_minutes: Option<f64>,
}

/// Provenance of the page a recipe was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecipeSource {
    pub url: Option<String>,
    pub platform: Platform,
}

/// Canonical extracted recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    pub servings: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub notes: Option<Vec<String>>,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub source: RecipeSource,
}

/// Build an ordered step list numbered `1..=N` from instruction texts.
///
/// Blank instructions are dropped before numbering so the sequence has no gaps.
pub fn number_steps<I, S>(instructions: I) -> Vec<Step>
where
    I: IntoIterator<Item = (S, Option<f64>)>,
    S: AsRef<str>,
{
    instructions
        .into_iter()
        .filter_map(|(text, minutes)| {
            let text = text.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some((text, minutes))
        })
        .enumerate()
        .map(|(idx, (instruction, time_minutes))| Step { order: idx as u32 + 1, instruction, time_minutes })
        .collect()
}

impl Recipe {
    /// True when `steps[i].order == i + 1` for every step.
    pub fn has_contiguous_steps(&self) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(idx, step)| step.order as usize == idx + 1)
    }
}

/// Outcome of source resolution for one input URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
    /// Platform of the input URL.
    pub platform: Platform,
    /// Meta and visible text of the input page, capped.
    pub extracted_text: String,
    /// First-seen-ordered, deduplicated URLs found on the input page.
    pub candidate_urls: Vec<String>,
    /// Outbound link judged to be a dedicated recipe page, if any.
    pub resolved_recipe_url: Option<String>,
    /// Page points at an out-of-band link and nothing qualified.
    pub needs_manual_link: bool,
}

/// Which extraction path produced a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Parsed from JSON-LD recipe markup.
    PageScrape,
    /// Extracted by the language model from mined page text.
    PageTextAi,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::PageScrape => "PAGE_SCRAPE",
            SourceType::PageTextAi => "PAGE_TEXT_AI",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAGE_SCRAPE" => Ok(SourceType::PageScrape),
            "PAGE_TEXT_AI" => Ok(SourceType::PageTextAi),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}
