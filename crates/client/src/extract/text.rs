//! Visible text extraction from HTML.
//!
//! ### Generic Strategy
//! - Strip non-content elements (scripts, styles, navigation chrome, embeds).
//! - Prefer `<article>`, then `<main>`/`[role=main]`, then `<body>`.
//! - Break lines at block elements, collapse whitespace, drop empty lines.
//! - Prepend a `Title:`/`Description:` header and cap the result.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

use super::truncate_chars;

/// Cap on text produced by [`html_to_text`].
pub const MAX_READABLE_CHARS: usize = 80_000;

/// Cap on the resolver's combined meta and body text.
pub const MAX_COMBINED_CHARS: usize = 50_000;

const SKIPPED_TAGS: &[&str] =
    &["script", "style", "noscript", "template", "nav", "header", "footer", "svg", "iframe", "embed", "object"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article", "main", "aside",
    "table", "tr", "td", "th", "blockquote", "pre", "figure", "figcaption", "dd", "dt", "hr",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[name="description"]"#));
static OG_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:description"]"#));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| selector(r#"main, [role="main"]"#));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// Best-effort page metadata. Missing tags are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_description: String,
}

fn meta_content(doc: &Html, sel: &Selector) -> String {
    doc.select(sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .unwrap_or_default()
}

/// Read `<title>` (or `og:title`), meta description and `og:description`.
pub fn page_meta(doc: &Html) -> PageMeta {
    let title = doc
        .select(&TITLE)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| meta_content(doc, &OG_TITLE));

    PageMeta {
        title,
        description: meta_content(doc, &META_DESCRIPTION),
        og_description: meta_content(doc, &OG_DESCRIPTION),
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, out);
                }
                if BLOCK_TAGS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Text of `el` with non-content elements removed, one block per line.
pub fn element_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(el, &mut raw);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The content region: first `<article>`, else `<main>`, else `<body>`.
fn content_region(doc: &Html) -> ElementRef<'_> {
    doc.select(&ARTICLE)
        .next()
        .or_else(|| doc.select(&MAIN).next())
        .or_else(|| doc.select(&BODY).next())
        .unwrap_or_else(|| doc.root_element())
}

/// Visible body text with noise stripped.
pub fn visible_text(doc: &Html) -> String {
    match doc.select(&BODY).next() {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

/// Meta description, `og:description` and visible body text, capped at
/// [`MAX_COMBINED_CHARS`]. Used by the resolver to look for outbound links.
pub fn combined_page_text(doc: &Html) -> String {
    let meta = page_meta(doc);
    let combined = [meta.description, meta.og_description, visible_text(doc)]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(&combined, MAX_COMBINED_CHARS)
}

/// Generic page-to-prose conversion for the AI fallback.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let meta = page_meta(&doc);
    let description = if meta.description.is_empty() { meta.og_description } else { meta.description };

    let mut out = String::new();
    if !meta.title.is_empty() {
        out.push_str(&format!("Title: {}\n", meta.title));
    }
    if !description.is_empty() {
        out.push_str(&format!("Description: {description}\n"));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&element_text(content_region(&doc)));

    truncate_chars(&out, MAX_READABLE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
        <head>
            <title>  Garlic   Noodles </title>
            <meta name="description" content="Quick weeknight noodles">
            <meta property="og:description" content="Recipe at https://cooking.example/garlic-noodles">
            <style>.x { color: red }</style>
        </head>
        <body>
            <nav>Home | Recipes | About</nav>
            <header>Site Header</header>
            <main>
                <h1>Garlic Noodles</h1>
                <p>Boil the   noodles.</p>
                <script>var tracking = 1;</script>
                <ul><li>4 cloves garlic</li><li>2 tbsp butter</li></ul>
            </main>
            <footer>Copyright</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_page_meta() {
        let doc = Html::parse_document(PAGE);
        let meta = page_meta(&doc);
        assert_eq!(meta.title, "Garlic Noodles");
        assert_eq!(meta.description, "Quick weeknight noodles");
        assert!(meta.og_description.contains("cooking.example"));
    }

    #[test]
    fn test_page_meta_missing_is_empty() {
        let doc = Html::parse_document("<html><body><p>hi</p></body></html>");
        assert_eq!(page_meta(&doc), PageMeta::default());
    }

    #[test]
    fn test_html_to_text_strips_noise() {
        let text = html_to_text(PAGE);
        assert!(text.starts_with("Title: Garlic Noodles\nDescription: Quick weeknight noodles\n\n"));
        assert!(text.contains("Boil the noodles."));
        assert!(text.contains("4 cloves garlic\n2 tbsp butter"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Home | Recipes"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_html_to_text_prefers_article() {
        let html = "<body><div>sidebar</div><article><p>the recipe</p></article></body>";
        let text = html_to_text(html);
        assert_eq!(text, "the recipe");
    }

    #[test]
    fn test_html_to_text_is_capped() {
        let html = format!("<body><p>{}</p></body>", "a".repeat(MAX_READABLE_CHARS + 500));
        assert_eq!(html_to_text(&html).chars().count(), MAX_READABLE_CHARS);
    }

    #[test]
    fn test_combined_page_text_includes_meta_and_body() {
        let doc = Html::parse_document(PAGE);
        let text = combined_page_text(&doc);
        assert!(text.starts_with("Quick weeknight noodles\nRecipe at https://cooking.example/garlic-noodles\n"));
        assert!(text.contains("Boil the noodles."));
        assert!(!text.contains("Site Header"));
    }
}
