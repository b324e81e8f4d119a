//! Recipe-relevant content extraction from fetched HTML.
//!
//! - [`links`]: URLs embedded in free text.
//! - [`text`]: visible text and page metadata.
//! - [`jsonld`]: JSON-LD `Recipe` records.
//! - [`video`]: description mining from embedded player state on video pages.

pub mod jsonld;
pub mod links;
pub mod text;
pub mod video;

pub use jsonld::parse_structured_recipe;
pub use links::{dedup_preserving_order, harvest_urls};
pub use text::{PageMeta, combined_page_text, html_to_text, page_meta, visible_text};
pub use video::{mine_video_description, video_link_texts, video_page_text};

/// Keep at most `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
