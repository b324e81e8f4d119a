//! Description mining for video pages.
//!
//! Video watch pages ship their client state as a large inline JSON object
//! (`ytInitialPlayerResponse`, `ytInitialData`). Its layout is undocumented
//! and shifts over time, so instead of navigating fixed paths the whole tree
//! is scanned for text blocks that look like a description:
//!
//! - `simpleText` / `shortDescription` strings of at least [`MIN_CANDIDATE_CHARS`]
//! - `runs` arrays whose joined `text` fragments are long enough and mention
//!   recipe vocabulary (ingredients, units, temperatures)
//!
//! The longest candidate wins as model input. Link harvesting is wider: every
//! candidate plus every `shortDescription`, however short, since a bare
//! "Full recipe: <url>" description is still the best pointer on the page.
//! Pages without a parsable blob fall back to generic text extraction.

use regex::Regex;
use scraper::Html;
use serde_json::Value;
use std::sync::LazyLock;

use super::text::{MAX_READABLE_CHARS, html_to_text, page_meta};
use super::truncate_chars;

/// Shortest text block considered a description candidate.
pub const MIN_CANDIDATE_CHARS: usize = 80;

const SIMPLE_TEXT_KEYS: &[&str] = &["simpleText", "shortDescription"];

static BLOB_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:var\s+|window\[["'])?(?:ytInitialPlayerResponse|ytInitialData)(?:["']\])?\s*=\s*"#)
        .expect("invalid blob marker pattern")
});

static RECIPE_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ingredients?|recipe|directions|instructions|cups?|tbsp|tsp|tablespoons?|teaspoons?|grams?|g|kg|ml|oz|ounces?|lbs?|pounds?|cloves?|pinch|preheat|bake|simmer|degrees|fahrenheit|celsius)\b|\d+\s?°\s?[cf]?",
    )
    .expect("invalid recipe vocabulary pattern")
});

/// Parse every embedded state blob in `html`. Unparsable blobs are skipped.
pub fn find_state_blobs(html: &str) -> Vec<Value> {
    BLOB_MARKER
        .find_iter(html)
        .filter_map(|m| {
            let tail = &html[m.end()..];
            if !tail.starts_with('{') {
                return None;
            }
            match serde_json::Deserializer::from_str(tail).into_iter::<Value>().next() {
                Some(Ok(value)) => Some(value),
                Some(Err(e)) => {
                    tracing::debug!(offset = m.start(), error = %e, "embedded state blob did not parse");
                    None
                }
                None => None,
            }
        })
        .collect()
}

/// True when joined `runs` text looks like recipe content.
pub fn looks_like_recipe_text(text: &str) -> bool {
    RECIPE_VOCABULARY.is_match(text)
}

/// Depth-first scan of `root` for description-like text blocks, in document order.
///
/// Uses an explicit stack so deeply nested payloads cannot exhaust the call stack.
pub fn collect_candidates(root: &Value) -> Vec<String> {
    scan(root, MIN_CANDIDATE_CHARS)
}

/// Every text block worth harvesting links from: the candidates plus all
/// non-empty `shortDescription` strings.
pub fn collect_link_texts(root: &Value) -> Vec<String> {
    scan(root, 1)
}

fn scan(root: &Value, min_description_chars: usize) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    match child {
                        Value::String(s) if SIMPLE_TEXT_KEYS.contains(&key.as_str()) => {
                            let min = if key == "shortDescription" {
                                min_description_chars.min(MIN_CANDIDATE_CHARS)
                            } else {
                                MIN_CANDIDATE_CHARS
                            };
                            if s.chars().count() >= min {
                                found.push(s.clone());
                            }
                        }
                        Value::Array(runs) if key == "runs" => {
                            let joined: String = runs
                                .iter()
                                .filter_map(|run| run.get("text").and_then(Value::as_str))
                                .collect();
                            if joined.chars().count() >= MIN_CANDIDATE_CHARS && looks_like_recipe_text(&joined) {
                                found.push(joined);
                            }
                        }
                        _ => {}
                    }
                }
                stack.extend(map.values().rev());
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }

    found
}

/// The longest candidate; on equal length the earliest wins.
pub fn select_best(candidates: Vec<String>) -> Option<String> {
    let mut best: Option<(usize, String)> = None;
    for candidate in candidates {
        let len = candidate.chars().count();
        if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
            best = Some((len, candidate));
        }
    }
    best.map(|(_, text)| text)
}

/// Mine the best description from the page's embedded state, if any.
pub fn mine_video_description(html: &str) -> Option<String> {
    let candidates: Vec<String> = find_state_blobs(html).iter().flat_map(collect_candidates).collect();
    let best = select_best(candidates);
    if let Some(text) = &best {
        tracing::debug!(chars = text.chars().count(), "mined video description");
    }
    best
}

/// Text blocks from the page's embedded state to harvest links from.
pub fn video_link_texts(html: &str) -> Vec<String> {
    find_state_blobs(html).iter().flat_map(collect_link_texts).collect()
}

/// Text for AI extraction from a video page: the page title plus the mined
/// description, or generic page text when nothing could be mined.
pub fn video_page_text(html: &str) -> String {
    let Some(description) = mine_video_description(html) else {
        return html_to_text(html);
    };

    let title = page_meta(&Html::parse_document(html)).title;
    let text = if title.is_empty() { description } else { format!("Title: {title}\n\n{description}") };
    truncate_chars(&text, MAX_READABLE_CHARS)
}
