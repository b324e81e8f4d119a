//! Source resolution: should extraction target the input page or an
//! outbound link to a dedicated recipe page?
//!
//! ### Algorithm
//! 1. Classify the input URL and fetch its page. Fetch errors are a hard stop.
//! 2. Combine meta description, `og:description` and visible body text.
//! 3. Harvest URLs from that text; on video hosts also from the mined
//!    description, where creators usually put their links.
//! 4. Deduplicate, keeping first-seen order.
//! 5. Rank hinting candidates (`/recipe`, `ingredients`, ...) first, stable.
//! 6. Accept the first hinting candidate whose host is not a social/video
//!    platform. Candidates without a hint are never auto-accepted.

use scraper::Html;
use std::sync::Arc;
use url::Url;

use ladle_core::{AppConfig, Error, Platform, ResolveResult};

use crate::extract::{combined_page_text, dedup_preserving_order, harvest_urls, video_link_texts};
use crate::fetch::PageFetcher;
use crate::platform::{classify, page_url_for};

/// Most candidate URLs kept per page.
pub const MAX_CANDIDATES: usize = 50;

/// Injectable domain and phrase sets for resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Hosts (and their subdomains) never accepted as a recipe link.
    pub blocked_domains: Vec<String>,
    /// Case-insensitive URL substrings that mark a recipe page.
    pub recipe_hints: Vec<String>,
    /// Case-insensitive phrases pointing at an out-of-band link.
    pub manual_link_phrases: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ResolverConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            blocked_domains: config.blocked_domains.clone(),
            recipe_hints: config.recipe_hints.clone(),
            manual_link_phrases: config.manual_link_phrases.clone(),
        }
    }
}

/// True when `url`'s host equals a blocked domain or is a subdomain of one.
///
/// URLs without a parsable host are treated as blocked.
pub fn is_blocked_host(url: &str, blocked_domains: &[String]) -> bool {
    let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_ascii_lowercase)) else {
        return true;
    };
    let host = host.strip_suffix('.').unwrap_or(&host);

    blocked_domains.iter().any(|domain| {
        let domain = domain.trim().to_ascii_lowercase();
        !domain.is_empty() && (host == domain || host.ends_with(&format!(".{domain}")))
    })
}

/// True when `url` contains any recipe hint, case-insensitively.
pub fn has_recipe_hint(url: &str, recipe_hints: &[String]) -> bool {
    let lower = url.to_lowercase();
    recipe_hints
        .iter()
        .any(|hint| !hint.is_empty() && lower.contains(&hint.to_lowercase()))
}

/// Hinting candidates first; relative order is otherwise preserved.
pub fn rank_candidates<'a>(candidates: &'a [String], recipe_hints: &[String]) -> Vec<&'a str> {
    let mut ranked: Vec<&str> = candidates.iter().map(String::as_str).collect();
    ranked.sort_by_key(|url| !has_recipe_hint(url, recipe_hints));
    ranked
}

/// The first ranked candidate that carries a hint and is not on a blocked host.
pub fn select_recipe_url(candidates: &[String], config: &ResolverConfig) -> Option<String> {
    rank_candidates(candidates, &config.recipe_hints)
        .into_iter()
        .filter(|url| !is_blocked_host(url, &config.blocked_domains))
        .find(|url| has_recipe_hint(url, &config.recipe_hints))
        .map(str::to_string)
}

/// True when `text` contains any manual-link phrase, case-insensitively.
pub fn mentions_manual_link(text: &str, phrases: &[String]) -> bool {
    let lower = text.to_lowercase();
    phrases.iter().any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
}

/// Decides where a recipe lives for a given input URL.
pub struct SourceResolver {
    fetcher: Arc<dyn PageFetcher>,
    config: ResolverConfig,
}

impl SourceResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ResolverConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch `input_url` and resolve it.
    pub async fn resolve(&self, input_url: &str) -> Result<ResolveResult, Error> {
        let platform = classify(input_url);
        let html = self.fetcher.fetch_html(&page_url_for(input_url)).await?;
        let result = self.resolve_html(platform, &html);

        tracing::debug!(
            url = input_url,
            platform = %platform,
            candidates = result.candidate_urls.len(),
            resolved = result.resolved_recipe_url.as_deref().unwrap_or(""),
            needs_manual_link = result.needs_manual_link,
            "resolved source"
        );

        Ok(result)
    }

    /// Resolve an already-fetched page.
    pub fn resolve_html(&self, platform: Platform, html: &str) -> ResolveResult {
        let extracted_text = combined_page_text(&Html::parse_document(html));

        let mut urls = harvest_urls(&extracted_text);
        let mut phrase_text = extracted_text.clone();
        if platform.is_video_host() {
            for text in video_link_texts(html) {
                urls.extend(harvest_urls(&text));
                phrase_text.push('\n');
                phrase_text.push_str(&text);
            }
        }

        let mut candidate_urls = dedup_preserving_order(urls);
        candidate_urls.truncate(MAX_CANDIDATES);

        let resolved_recipe_url = select_recipe_url(&candidate_urls, &self.config);
        let needs_manual_link =
            resolved_recipe_url.is_none() && mentions_manual_link(&phrase_text, &self.config.manual_link_phrases);

        ResolveResult { platform, extracted_text, candidate_urls, resolved_recipe_url, needs_manual_link }
    }
}
