//! Platform classification by hostname.

use ladle_core::Platform;
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];
const INSTAGRAM_HOSTS: &[&str] = &["instagram.com", "instagr.am"];

/// Classify a URL by case-insensitive substring match on its host.
///
/// Falls back to matching the whole string when it does not parse as a URL,
/// so every input gets an answer.
pub fn classify(url: &str) -> Platform {
    let haystack = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| url.to_lowercase());

    if YOUTUBE_HOSTS.iter().any(|h| haystack.contains(h)) {
        Platform::Youtube
    } else if INSTAGRAM_HOSTS.iter().any(|h| haystack.contains(h)) {
        Platform::Instagram
    } else {
        Platform::Other
    }
}

/// A YouTube video id and its canonical watch page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YoutubeVideo {
    pub video_id: Option<String>,
    pub watch_url: String,
}

fn is_video_id(s: &str) -> bool {
    s.len() >= 6 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Map shorts, embed, short-link and watch URLs onto `https://www.youtube.com/watch?v=<id>`.
///
/// Anything unrecognized comes back unchanged with no id.
pub fn normalize_youtube_url(input: &str) -> YoutubeVideo {
    let unchanged = || YoutubeVideo { video_id: None, watch_url: input.to_string() };

    let Ok(url) = Url::parse(input.trim()) else {
        return unchanged();
    };
    let host = url.host_str().unwrap_or_default().to_lowercase();

    let id = if host.ends_with("youtu.be") {
        url.path_segments().and_then(|mut s| s.next()).map(str::to_string)
    } else if let Some(rest) = url.path().strip_prefix("/shorts/").or_else(|| url.path().strip_prefix("/embed/")) {
        rest.split('/').next().map(str::to_string)
    } else {
        url.query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
    };

    match id.filter(|id| is_video_id(id)) {
        Some(id) => YoutubeVideo { watch_url: format!("https://www.youtube.com/watch?v={id}"), video_id: Some(id) },
        None => unchanged(),
    }
}

/// The page to fetch for `input`: the canonical watch page for YouTube
/// links, since shorts and short-link pages carry thinner markup.
pub fn page_url_for(input: &str) -> String {
    match classify(input) {
        Platform::Youtube => normalize_youtube_url(input).watch_url,
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_youtube_hosts() {
        assert_eq!(classify("https://www.youtube.com/watch?v=abc123"), Platform::Youtube);
        assert_eq!(classify("https://YOUTU.BE/abc123"), Platform::Youtube);
        assert_eq!(classify("https://m.youtube.com/shorts/abc123"), Platform::Youtube);
    }

    #[test]
    fn test_classify_instagram() {
        assert_eq!(classify("https://www.instagram.com/reel/Cxyz/"), Platform::Instagram);
    }

    #[test]
    fn test_classify_other_and_unparsable() {
        assert_eq!(classify("https://example.com/how-to/kimchi"), Platform::Other);
        assert_eq!(classify("not a url"), Platform::Other);
        assert_eq!(classify(""), Platform::Other);
        assert_eq!(classify("youtube.com/watch?v=abc123"), Platform::Youtube);
    }

    #[test]
    fn test_classify_matches_host_not_path() {
        assert_eq!(classify("https://example.com/youtube.com/video"), Platform::Other);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let url = "https://youtu.be/xyz789";
        assert_eq!(classify(url), classify(url));
    }

    #[test]
    fn test_normalize_shorts() {
        let v = normalize_youtube_url("https://www.youtube.com/shorts/AbC_123-x?feature=share");
        assert_eq!(v.video_id.as_deref(), Some("AbC_123-x"));
        assert_eq!(v.watch_url, "https://www.youtube.com/watch?v=AbC_123-x");
    }

    #[test]
    fn test_normalize_embed() {
        let v = normalize_youtube_url("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?start=10");
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(v.watch_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_normalize_short_link_and_watch() {
        let v = normalize_youtube_url("https://youtu.be/dQw4w9WgXcQ?si=abc");
        assert_eq!(v.watch_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        let v = normalize_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42");
        assert_eq!(v.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_normalize_unrecognized() {
        let v = normalize_youtube_url("https://www.youtube.com/@somechannel");
        assert_eq!(v.video_id, None);
        assert_eq!(v.watch_url, "https://www.youtube.com/@somechannel");
    }

    #[test]
    fn test_page_url_for() {
        assert_eq!(page_url_for("https://youtu.be/dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(page_url_for("https://example.com/r"), "https://example.com/r");
    }
}
