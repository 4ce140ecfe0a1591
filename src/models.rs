//! Data models for fetched articles and cross-reference results.
//!
//! This module defines the value objects that flow through the engine:
//! - [`FetchedArticle`]: a successful content acquisition, tagged with the
//!   strategy that produced it
//! - [`RelatedCandidate`]: a same-site article discovered and scored during
//!   related-article search
//! - [`TopicComparison`] / [`CandidateAnalysis`] / [`RelatedArticleReport`]:
//!   the comparison bundle handed to the analysis and presentation layers
//!
//! All of these are freshly constructed per request and never mutated after
//! construction; there is no shared mutable state across concurrent fetches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The strategy that produced a [`FetchedArticle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMethod {
    /// Plain HTTP plus the selector-cascade extractor.
    #[serde(rename = "direct_http")]
    DirectHttp,
    /// Direct HTTP, but the content cleared only the partial floor (50-150
    /// chars); treat as incomplete.
    #[serde(rename = "direct_http(partial)")]
    DirectHttpPartial,
    /// The article-extraction library (readability).
    #[serde(rename = "article_extractor")]
    ArticleExtractor,
    /// An RSS feed entry's summary stood in for the article body.
    #[serde(rename = "rss_feed")]
    RssFeed,
    /// Headless-browser automation against the rendered DOM.
    #[serde(rename = "headless_browser")]
    HeadlessBrowser,
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FetchMethod::DirectHttp => "direct_http",
            FetchMethod::DirectHttpPartial => "direct_http(partial)",
            FetchMethod::ArticleExtractor => "article_extractor",
            FetchMethod::RssFeed => "rss_feed",
            FetchMethod::HeadlessBrowser => "headless_browser",
        };
        f.write_str(s)
    }
}

/// A successfully fetched article.
///
/// Invariant: `content` is non-empty and at least the configured absolute
/// floor (50 chars by default); the fetch chain never constructs one below
/// that. A populated `warning` marks a partial extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedArticle {
    /// The URL the content was fetched from.
    pub url: String,
    /// Resolved title, if any of the title heuristics matched.
    pub title: Option<String>,
    /// The extracted article text.
    pub content: String,
    /// The strategy that produced this result.
    pub method: FetchMethod,
    /// Set when the content cleared only a partial threshold and may be
    /// incomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl FetchedArticle {
    /// Character length of the extracted content.
    pub fn content_length(&self) -> usize {
        self.content.len()
    }
}

/// Where a related-article candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// A conventional feed path on the same origin.
    RssFeed,
    /// A "related articles" link block on the article page itself.
    PageLinks,
}

/// A candidate related article, scored by lexical relevance.
///
/// Uniqueness: a candidate's `url` never equals the origin article's URL and
/// is never a substring-alias of it (tracking-parameter variants).
/// `relevance_score` is built additively from keyword and topic matches and
/// is always at least the configured acceptance floor (2 by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedCandidate {
    /// The candidate article's URL.
    pub url: String,
    /// The candidate's title.
    pub title: String,
    /// Feed summary, or empty for page-link discoveries.
    pub summary: String,
    /// Additive keyword/topic match score.
    pub relevance_score: u32,
    /// Which discovery source produced this candidate.
    pub source: CandidateSource,
    /// Publication timestamp when the feed provided a parseable date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

/// Set-based topic deltas between the current article and one candidate.
///
/// Each list is capped (5 topics, 3 sentences by default) to keep downstream
/// payloads small.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicComparison {
    /// Topics present in both texts.
    pub common_topics: Vec<String>,
    /// Topics only the related article mentions.
    pub topics_only_in_related: Vec<String>,
    /// Topics only the current article mentions.
    pub topics_only_in_current: Vec<String>,
    /// Sentences from the related article with no counterpart in the current
    /// one, filtered to substantive ones.
    pub unique_related_sentences: Vec<String>,
}

/// One candidate enriched with its comparison against the current article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    /// The candidate's URL.
    pub url: String,
    /// The candidate's title.
    pub title: String,
    /// Relevance score carried over from discovery.
    pub relevance_score: u32,
    /// Summary truncated for display.
    pub summary: String,
    /// Topic and sentence deltas.
    pub comparison: TopicComparison,
    /// Whether the best-effort full fetch of the candidate succeeded.
    pub full_content_available: bool,
    /// Length of the fetched candidate content, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

/// The cross-reference bundle for one analyzed article.
///
/// Callers must branch on `related_articles_found`, not on `articles.len()`:
/// an empty result carries a human-readable `message` explaining why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedArticleReport {
    /// Whether any related articles were found.
    pub related_articles_found: bool,
    /// Number of analyzed candidates.
    pub total_found: usize,
    /// Per-candidate analyses, descending by relevance.
    pub articles: Vec<CandidateAnalysis>,
    /// Present when no candidates were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelatedArticleReport {
    /// The empty-result shape, with its reason spelled out.
    pub fn none_found(message: impl Into<String>) -> Self {
        Self {
            related_articles_found: false,
            total_found: 0,
            articles: Vec::new(),
            message: Some(message.into()),
        }
    }
}
