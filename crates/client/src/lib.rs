//! Recipe resolution and extraction for ladle.
//!
//! This crate provides the document fetcher, link harvesting, page text
//! mining, JSON-LD parsing, source resolution, the AI fallback and the
//! pipeline that ties them together.

pub mod ai;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod platform;
pub mod resolve;
pub mod service;

pub use ai::{FakeRecipeExtractor, OpenAiConfig, OpenAiRecipeExtractor, RecipeExtractor};
pub use extract::{harvest_urls, html_to_text, mine_video_description, parse_structured_recipe};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageFetcher, StaticFetcher, StaticPage};
pub use pipeline::{Extraction, RecipePipeline};
pub use platform::{classify, normalize_youtube_url};
pub use resolve::{ResolverConfig, SourceResolver};
pub use service::{RecipeService, StoredExtraction};
