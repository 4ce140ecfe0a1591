//! Heuristic HTML content extraction.
//!
//! Given raw markup, this module strips boilerplate, resolves a title from
//! meta tags and headings, and walks a cascade of content heuristics from
//! high precision (`article`, `[role="article"]`) down to wildcard class/id
//! matches, paragraph aggregation, a `div` scan, and finally whole-body text.
//!
//! The acceptance thresholds are deliberately low and layered: the extractor
//! prefers returning *something* plausible (annotated with a warning) over
//! failing, and only gives up below the absolute floor.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use crate::config::Thresholds;
use crate::error::FetchError;
use crate::models::{FetchMethod, FetchedArticle};

/// Content selectors tried in order, highest precision first.
const CONTENT_SELECTORS: [&str; 27] = [
    "article",
    r#"[role="article"]"#,
    ".article-content",
    ".article-body",
    ".post-content",
    ".story-body",
    ".content-body",
    ".entry-content",
    ".post-body",
    ".article-text",
    ".article-main",
    ".story-content",
    ".article-wrapper",
    ".content-wrapper",
    r#"[class*="article"]"#,
    r#"[class*="story"]"#,
    r#"[class*="content"]"#,
    r#"[class*="post"]"#,
    r#"[class*="entry"]"#,
    "main",
    ".main-content",
    "#main-content",
    "#article-content",
    "#story-content",
    r#"[id*="article"]"#,
    r#"[id*="content"]"#,
    r#"[id*="story"]"#,
];

static COMPILED_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static TITLE_OG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE_TWITTER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="twitter:title"]"#).unwrap());
static TITLE_H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

// Boilerplate removed before any text extraction. The regex alternation is a
// pragmatic stand-in for DOM decomposition; unbalanced nesting of the same
// tag is rare enough in the wild for this heuristic.
static STRIP_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<nav\b.*?</nav>|<header\b.*?</header>|<footer\b.*?</footer>|<aside\b.*?</aside>|<!--.*?-->",
    )
    .unwrap()
});

/// Extract title and article text from raw HTML.
///
/// Returns a [`FetchedArticle`] with `method` set to
/// [`FetchMethod::DirectHttp`], or the partial variant when the content
/// cleared only a sub-150-char threshold. Fails with
/// [`FetchError::InsufficientContent`] below the absolute floor.
pub fn extract(html: &str, url: &Url, t: &Thresholds) -> Result<FetchedArticle, FetchError> {
    let cleaned = STRIP_TAGS.replace_all(html, "");
    let document = Html::parse_document(&cleaned);

    let title = resolve_title(&document);
    let content = resolve_content(&document, t);

    let content = clean_lines(&content, t.max_lines);
    let len = content.len();
    debug!(%url, bytes = len, "Extracted article content");

    if len < t.absolute_floor {
        return Err(FetchError::InsufficientContent);
    }

    let (method, warning) = if len < t.selector_floor {
        (
            FetchMethod::DirectHttpPartial,
            Some("Content may be incomplete - consider manual paste for full article".to_string()),
        )
    } else {
        (FetchMethod::DirectHttp, None)
    };

    Ok(FetchedArticle {
        url: url.to_string(),
        title,
        content,
        method,
        warning,
    })
}

/// First non-empty of: `og:title`, `twitter:title`, first `<h1>`, `<title>`.
pub fn resolve_title(document: &Html) -> Option<String> {
    for selector in [&*TITLE_OG, &*TITLE_TWITTER] {
        if let Some(el) = document.select(selector).next() {
            if let Some(content) = el.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    for selector in [&*TITLE_H1, &*TITLE_TAG] {
        if let Some(el) = document.select(selector).next() {
            let text = element_text(&el);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn resolve_content(document: &Html, t: &Thresholds) -> String {
    // Step 1: selector cascade, first selector whose match is long enough.
    for (selector_str, selector) in CONTENT_SELECTORS.iter().zip(COMPILED_SELECTORS.iter()) {
        if let Some(el) = document.select(selector).next() {
            let text = element_text(&el);
            if text.len() >= t.selector_floor {
                trace!(selector = selector_str, bytes = text.len(), "Selector cascade matched");
                return text;
            }
        }
    }

    // Step 2: aggregate sufficiently long paragraphs.
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .map(|p| element_text(&p))
        .filter(|text| text.len() > t.min_paragraph)
        .collect();
    let aggregated = paragraphs.join("\n");
    if aggregated.len() >= t.paragraph_floor {
        trace!(paragraphs = paragraphs.len(), "Paragraph aggregation matched");
        return aggregated;
    }

    // Step 3: longest content-looking div.
    let mut best_div = String::new();
    for div in document.select(&DIV) {
        let Some(class) = div.value().attr("class") else {
            continue;
        };
        let class = class.to_lowercase();
        if class.contains("content") || class.contains("article") || class.contains("story") {
            let text = element_text(&div);
            if text.len() > t.paragraph_floor && text.len() > best_div.len() {
                best_div = text;
            }
        }
    }
    if best_div.len() >= t.partial_floor {
        trace!(bytes = best_div.len(), "Content div scan matched");
        return best_div;
    }

    // Anything from the earlier steps beats an empty body.
    if !aggregated.is_empty() && aggregated.len() >= best_div.len() {
        return aggregated;
    }
    if !best_div.is_empty() {
        return best_div;
    }

    // Last resort: cleaned body text wholesale.
    document
        .select(&BODY)
        .next()
        .map(|body| element_text(&body))
        .unwrap_or_default()
}

/// Text of an element and its descendants, one trimmed chunk per line.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop short and navigation-like lines, cap the line count.
fn clean_lines(content: &str, max_lines: usize) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.len() > 5)
        .filter(|line| !is_navigation_line(line))
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short all-caps strings are almost always menu items, not prose.
fn is_navigation_line(line: &str) -> bool {
    line.len() < 30
        && line.chars().any(|c| c.is_alphabetic())
        && !line.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    fn url() -> Url {
        Url::parse("https://example.com/news/story").unwrap()
    }

    fn long_text() -> String {
        "This is a 200-character article about economic policy. ".repeat(4)
    }

    #[test]
    fn test_article_element_wins_over_fallbacks() {
        let body = long_text();
        let html = format!(
            "<html><body><article>{body}</article><p>{body}</p><div class=\"content\">{body}</div></body></html>"
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(result.method, FetchMethod::DirectHttp);
        assert!(result.content.contains("economic policy"));
        // The article element is a single region; paragraph aggregation would
        // have produced the same text twice.
        assert_eq!(result.content.matches("This is a 200-character").count(), 4);
    }

    #[test]
    fn test_paragraph_aggregation_when_no_semantic_container() {
        let html = format!(
            "<html><body><div><p>{}</p><p>{}</p><p>tiny</p></div></body></html>",
            "First paragraph with plenty of words about the new trade agreement signed today.",
            "Second paragraph describing reactions from officials and analysts across the region."
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert!(result.content.contains("First paragraph"));
        assert!(result.content.contains("Second paragraph"));
        assert!(!result.content.contains("tiny"));
    }

    #[test]
    fn test_content_div_scan_picks_longest() {
        let long = "Substantial story text in a class-hinted container. ".repeat(4);
        let short = "Shorter content block that still clears one hundred characters of text for the scan.";
        let html = format!(
            "<html><body><div class=\"story-extra\">{short}</div><div class=\"main-content-zone\">{long}</div></body></html>"
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert!(result.content.contains("Substantial story text"));
    }

    #[test]
    fn test_div_scan_floor_follows_thresholds() {
        let t = Thresholds {
            paragraph_floor: 60,
            partial_floor: 60,
            ..Thresholds::default()
        };
        let text = "A compact story block with just enough text to pass a recalibrated floor.";
        let html = format!(
            "<html><body><span>Subscribe to our newsletter today</span>\
             <div class=\"content-box\">{text}</div></body></html>"
        );
        let result = extract(&html, &url(), &t).unwrap();
        assert_eq!(result.content, text);
        assert!(!result.content.contains("Subscribe"));
    }

    #[test]
    fn test_title_prefers_og_over_h1() {
        let html = format!(
            "<html><head><meta property=\"og:title\" content=\"OG Headline\"><title>Tag Title</title></head>\
             <body><h1>H1 Headline</h1><article>{}</article></body></html>",
            long_text()
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(result.title.as_deref(), Some("OG Headline"));
    }

    #[test]
    fn test_title_falls_back_to_h1_then_title_tag() {
        let html = format!(
            "<html><head><title>Tag Title</title></head><body><h1>H1 Headline</h1><article>{}</article></body></html>",
            long_text()
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(result.title.as_deref(), Some("H1 Headline"));

        let html = format!(
            "<html><head><title>Tag Title</title></head><body><article>{}</article></body></html>",
            long_text()
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(result.title.as_deref(), Some("Tag Title"));
    }

    #[test]
    fn test_boilerplate_tags_stripped_before_extraction() {
        let html = format!(
            "<html><body><nav>HOME WORLD SPORTS</nav><script>var x = 1;</script>\
             <article>{}</article><footer>Copyright notice text here</footer></body></html>",
            long_text()
        );
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert!(!result.content.contains("HOME WORLD"));
        assert!(!result.content.contains("var x"));
        assert!(!result.content.contains("Copyright"));
    }

    #[test]
    fn test_navigation_like_lines_dropped() {
        let body = format!("SUBSCRIBE NOW\n{}\nMENU ITEMS", long_text());
        let html = format!("<html><body><article>{body}</article></body></html>");
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert!(!result.content.contains("SUBSCRIBE NOW"));
        assert!(!result.content.contains("MENU ITEMS"));
        assert!(result.content.contains("economic policy"));
    }

    #[test]
    fn test_partial_band_gets_warning_and_qualified_method() {
        // Between the absolute floor (50) and the selector floor (150).
        let text = "A short piece of article text that is over fifty characters but under the floor.";
        let html = format!("<html><body><p>{text}</p></body></html>");
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(result.method, FetchMethod::DirectHttpPartial);
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_below_absolute_floor_is_an_error() {
        let html = "<html><body><p>Too short to keep.</p></body></html>";
        let err = extract(html, &url(), &thresholds()).unwrap_err();
        assert!(matches!(err, FetchError::InsufficientContent));
    }

    #[test]
    fn test_output_capped_at_max_lines() {
        let paragraphs: String = (0..300)
            .map(|i| format!("<p>Paragraph number {i} with enough text to clear the minimum.</p>"))
            .collect();
        let html = format!("<html><body>{paragraphs}</body></html>");
        let result = extract(&html, &url(), &thresholds()).unwrap();
        assert!(result.content.lines().count() <= 200);
    }

    #[test]
    fn test_idempotent_on_same_input() {
        let html = format!("<html><body><article>{}</article></body></html>", long_text());
        let a = extract(&html, &url(), &thresholds()).unwrap();
        let b = extract(&html, &url(), &thresholds()).unwrap();
        assert_eq!(a.content, b.content);
        assert_eq!(a.title, b.title);
    }
}
