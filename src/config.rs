//! Engine configuration and tunable thresholds.
//!
//! Every acceptance floor, cap, and timeout used by the fetch chain, the
//! extractor, and the related-article engine lives here as a configurable
//! value. The defaults are the empirically chosen numbers the heuristics were
//! calibrated with; they are surfaced as fields (rather than hard-coded)
//! so callers can recalibrate without forking the heuristics.

use std::time::Duration;

/// Content-length floors and output caps, in characters unless noted.
///
/// The floors are deliberately low and layered: the extractor prefers
/// returning *something* plausible (flagged as partial) over failing, and
/// only gives up below [`Thresholds::absolute_floor`].
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Minimum text length for a selector-cascade match to be accepted.
    pub selector_floor: usize,
    /// Minimum aggregate length below which paragraph extraction is retried
    /// with the `div` scan.
    pub paragraph_floor: usize,
    /// Minimum length below which the body-text last resort kicks in, and
    /// below which a direct result is flagged partial.
    pub partial_floor: usize,
    /// Hard minimum; shorter content is an extraction failure.
    pub absolute_floor: usize,
    /// Minimum paragraph text length for paragraph aggregation.
    pub min_paragraph: usize,
    /// Content length a strategy must clear for the chain to short-circuit.
    pub chain_accept: usize,
    /// Lower short-circuit bar for the RSS strategy (summaries, not full text).
    pub rss_accept: usize,
    /// Maximum lines kept after cleanup.
    pub max_lines: usize,
    /// Maximum characters kept from a browser-rendered extraction.
    pub browser_content_cap: usize,
    /// Minimum relevance score for a related-article candidate.
    pub relevance_floor: u32,
    /// Maximum keywords derived from title + content.
    pub max_keywords: usize,
    /// Feed entries scanned per feed during related-article discovery.
    pub feed_entry_scan: usize,
    /// Cap on each topic list in a comparison.
    pub max_topics: usize,
    /// Cap on unique-sentence findings per candidate.
    pub max_unique_sentences: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            selector_floor: 150,
            paragraph_floor: 100,
            partial_floor: 80,
            absolute_floor: 50,
            min_paragraph: 20,
            chain_accept: 100,
            rss_accept: 50,
            max_lines: 200,
            browser_content_cap: 5000,
            relevance_floor: 2,
            max_keywords: 10,
            feed_entry_scan: 20,
            max_topics: 5,
            max_unique_sentences: 3,
        }
    }
}

/// Immutable configuration injected into the engine at construction.
///
/// There is no ambient global state: the shared HTTP client is built from
/// this once, headers fixed, and reused across calls for connection reuse.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Browser-like User-Agent sent with every request.
    pub user_agent: String,
    /// Per-request network timeout.
    pub request_timeout: Duration,
    /// Wall-clock budget for the whole related-article discovery phase.
    pub related_deadline: Duration,
    /// Settle time after headless-browser navigation before the DOM is read.
    pub browser_settle: Duration,
    /// Conventional feed paths probed relative to the origin.
    pub feed_paths: Vec<String>,
    /// Terms treated as always-relevant topics when scoring feed entries.
    pub topic_terms: Vec<String>,
    /// All tunable floors and caps.
    pub thresholds: Thresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout: Duration::from_secs(20),
            related_deadline: Duration::from_secs(30),
            browser_settle: Duration::from_secs(3),
            feed_paths: ["/feed", "/rss", "/feeds/all.rss", "/rss.xml", "/feed.xml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            topic_terms: ["india", "modi", "putin", "russia", "diplomatic", "visit", "policy"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            thresholds: Thresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Browser-mimicking header pairs applied to the shared client.
    ///
    /// Fixed at construction; no request-scoped mutation.
    pub fn default_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("User-Agent", self.user_agent.clone()),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"
                    .to_string(),
            ),
            ("Accept-Language", "en-US,en;q=0.9".to_string()),
            ("Upgrade-Insecure-Requests", "1".to_string()),
            ("Sec-Fetch-Dest", "document".to_string()),
            ("Sec-Fetch-Mode", "navigate".to_string()),
            ("Sec-Fetch-Site", "none".to_string()),
            ("Sec-Fetch-User", "?1".to_string()),
            ("Cache-Control", "max-age=0".to_string()),
            ("DNT", "1".to_string()),
        ]
    }
}
