//! URL harvesting from free text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"')\]]+|\bwww\.[^\s<>"')\]]+"#).expect("invalid URL pattern")
});

/// Sentence punctuation that trails a link in prose but is never part of it.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Find every `http(s)://` and bare `www.` token in `text`, in input order.
///
/// `www.` tokens gain an `https://` prefix. Each token is canonicalized by
/// URL parsing, falling back to the raw token when parsing fails. Duplicates
/// are kept; see [`dedup_preserving_order`].
pub fn harvest_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let token = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            if token.is_empty() {
                return None;
            }
            let absolute = if token.len() >= 4 && token[..4].eq_ignore_ascii_case("www.") {
                format!("https://{token}")
            } else {
                token.to_string()
            };
            Some(Url::parse(&absolute).map(|u| u.to_string()).unwrap_or(absolute))
        })
        .collect()
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_http_and_www() {
        let text = "Full recipe: https://cooking.example/garlic-noodles and more at www.Example.com/blog.";
        assert_eq!(
            harvest_urls(text),
            vec!["https://cooking.example/garlic-noodles".to_string(), "https://www.example.com/blog".to_string()]
        );
    }

    #[test]
    fn test_harvest_stops_at_quotes_and_brackets() {
        let text = r#"<a href="https://a.example/x">(see https://b.example/y) [https://c.example/z]</a>"#;
        assert_eq!(
            harvest_urls(text),
            vec!["https://a.example/x".to_string(), "https://b.example/y".to_string(), "https://c.example/z".to_string()]
        );
    }

    #[test]
    fn test_harvest_keeps_duplicates_and_order() {
        let text = "https://b.example/ then https://a.example/ then https://b.example/";
        let urls = harvest_urls(text);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], urls[2]);
        assert_eq!(dedup_preserving_order(urls), vec!["https://b.example/".to_string(), "https://a.example/".to_string()]);
    }

    #[test]
    fn test_harvest_is_idempotent() {
        let text = "Try www.site.example/recipes/pho, http://Other.example/a?b=1 or HTTPS://third.example";
        let first = harvest_urls(text);
        let second = harvest_urls(&first.join(" "));
        assert_eq!(first, second);
        assert!(first.iter().all(|u| u.starts_with("http")));
        assert!(first.iter().all(|u| !u.starts_with("www.")));
    }

    #[test]
    fn test_harvest_nothing() {
        assert!(harvest_urls("no links here, just cabbage and salt").is_empty());
    }
}
