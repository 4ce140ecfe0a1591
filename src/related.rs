//! Related-article discovery: same-site feeds plus on-page link blocks.
//!
//! Discovery is strictly best-effort and budgeted: the whole phase runs
//! under a cooperative [`Deadline`] that is checked between feed probes and
//! candidates, never mid-request. Anything that fails (network, parse,
//! budget) is recorded as a [`Degradation`] and discovery carries on with
//! whatever it has; a missing feed never fails the caller's request.
//!
//! Relevance is additive and lexical: +1 per query keyword found in an
//! entry's text, +2 per configured topic term present in *both* the entry
//! and the current article. Candidates below the configured floor are
//! dropped.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use rss::Channel;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::EngineConfig;
use crate::error::Degradation;
use crate::models::{CandidateSource, RelatedCandidate};
use crate::topics;

/// Default cap on candidates returned from one discovery pass.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Link-block selectors scanned for on-page related articles.
const RELATED_LINK_SELECTORS: [&str; 6] = [
    ".related-articles a",
    ".related-posts a",
    ".related a",
    ".more-stories a",
    "aside a",
    ".sidebar a",
];

static COMPILED_LINK_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    RELATED_LINK_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid related-link selector"))
        .collect()
});

/// A wall-clock budget checked cooperatively between units of work.
///
/// Nothing is interrupted mid-flight; each loop asks [`Deadline::expired`]
/// before starting the next probe.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self { start: Instant::now(), budget }
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }
}

/// The outcome of one discovery pass: what was found, and what was skipped.
#[derive(Debug, Default)]
pub struct RelatedSearch {
    /// Accepted candidates, descending by relevance.
    pub candidates: Vec<RelatedCandidate>,
    /// Why sources yielded nothing, when they didn't.
    pub degradations: Vec<Degradation>,
}

/// Discovers and scores same-site related articles.
pub struct RelatedFinder {
    client: Client,
    config: Arc<EngineConfig>,
}

impl RelatedFinder {
    pub fn new(client: Client, config: Arc<EngineConfig>) -> Self {
        Self { client, config }
    }

    /// Run both discovery sources for the article at `url` under `deadline`.
    ///
    /// `title` and `content` are the *current* article's; they seed the query
    /// keywords and the topic-term matching.
    #[instrument(level = "info", skip_all, fields(%url, max = max_results))]
    pub async fn discover(
        &self,
        url: &Url,
        title: &str,
        content: &str,
        max_results: usize,
        deadline: Deadline,
    ) -> RelatedSearch {
        let keywords = topics::keywords(title, content, self.config.thresholds.max_keywords);
        let current_text = format!("{} {}", title, topics::prefix_chars(content, 1000))
            .to_lowercase();
        debug!(?keywords, "Derived query keywords");

        let mut search = RelatedSearch::default();

        self.discover_from_feeds(url, &keywords, &current_text, deadline, &mut search)
            .await;
        self.discover_from_page(url, &keywords, deadline, &mut search)
            .await;

        // First occurrence wins on duplicate URLs, so a feed entry beats the
        // same article rediscovered as a page link. Stable sort then keeps
        // feed candidates ahead of page links on score ties.
        search.candidates = search
            .candidates
            .into_iter()
            .unique_by(|c| c.url.trim_end_matches('/').to_string())
            .collect();
        search
            .candidates
            .retain(|c| c.relevance_score >= self.config.thresholds.relevance_floor);
        search.candidates.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        search.candidates.truncate(max_results);
        info!(
            found = search.candidates.len(),
            degraded = search.degradations.len(),
            "Discovery finished"
        );
        search
    }

    async fn discover_from_feeds(
        &self,
        url: &Url,
        keywords: &[String],
        current_text: &str,
        deadline: Deadline,
        search: &mut RelatedSearch,
    ) {
        let origin = match url.join("/") {
            Ok(o) => o,
            Err(e) => {
                search.degradations.push(Degradation::Parse(e.to_string()));
                return;
            }
        };

        for path in &self.config.feed_paths {
            if deadline.expired() {
                search.degradations.push(Degradation::DeadlineExpired);
                return;
            }
            let Ok(feed_url) = origin.join(path) else { continue };

            let channel = match self.load_channel(&feed_url).await {
                Ok(Some(c)) => c,
                Ok(None) => continue,
                Err(d) => {
                    search.degradations.push(d);
                    continue;
                }
            };
            debug!(feed = %feed_url, items = channel.items().len(), "Scanning feed");

            let scan = self.config.thresholds.feed_entry_scan;
            for item in channel.items().iter().take(scan) {
                let Some(link) = item.link() else { continue };
                if is_self_link(link, url.as_str()) {
                    continue;
                }

                let entry_title = item.title().unwrap_or_default();
                let summary = item.description().unwrap_or_default();
                let entry_text = format!("{entry_title} {summary}").to_lowercase();
                let score = score_entry(
                    &entry_text,
                    keywords,
                    &self.config.topic_terms,
                    current_text,
                );
                if score < self.config.thresholds.relevance_floor {
                    continue;
                }

                search.candidates.push(RelatedCandidate {
                    url: link.to_string(),
                    title: entry_title.trim().to_string(),
                    summary: summary.trim().to_string(),
                    relevance_score: score,
                    source: CandidateSource::RssFeed,
                    published: item.pub_date().and_then(parse_pub_date),
                });
            }
        }
    }

    async fn discover_from_page(
        &self,
        url: &Url,
        keywords: &[String],
        deadline: Deadline,
        search: &mut RelatedSearch,
    ) {
        if deadline.expired() {
            search.degradations.push(Degradation::DeadlineExpired);
            return;
        }

        let html = match self.client.get(url.clone()).send().await {
            Ok(r) if r.status().is_success() => match r.text().await {
                Ok(t) => t,
                Err(e) => {
                    search.degradations.push(Degradation::Network(e.to_string()));
                    return;
                }
            },
            Ok(r) => {
                search
                    .degradations
                    .push(Degradation::Network(format!("page returned {}", r.status())));
                return;
            }
            Err(e) => {
                search.degradations.push(Degradation::Network(e.to_string()));
                return;
            }
        };

        let document = Html::parse_document(&html);
        for selector in COMPILED_LINK_SELECTORS.iter() {
            for anchor in document.select(selector) {
                let Some(href) = anchor.value().attr("href") else { continue };
                let Ok(resolved) = url.join(href) else { continue };
                if resolved.host_str() != url.host_str() {
                    continue;
                }
                if is_self_link(resolved.as_str(), url.as_str()) {
                    continue;
                }

                let text = anchor.text().collect::<String>();
                let text = text.trim();
                if text.len() <= 10 {
                    continue;
                }
                let score = score_link_text(text, keywords);
                if score == 0 {
                    continue;
                }

                search.candidates.push(RelatedCandidate {
                    url: resolved.to_string(),
                    title: text.to_string(),
                    summary: String::new(),
                    relevance_score: score,
                    source: CandidateSource::PageLinks,
                    published: None,
                });
            }
        }
    }

    async fn load_channel(&self, feed_url: &Url) -> Result<Option<Channel>, Degradation> {
        let response = self
            .client
            .get(feed_url.clone())
            .send()
            .await
            .map_err(|e| Degradation::Network(e.to_string()))?;
        if !response.status().is_success() {
            // Most conventional paths 404; that is not a degradation.
            return Ok(None);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Degradation::Network(e.to_string()))?;
        match Channel::read_from(&bytes[..]) {
            Ok(c) => Ok(Some(c)),
            Err(e) => {
                warn!(feed = %feed_url, error = %e, "Feed body did not parse");
                Err(Degradation::Parse(e.to_string()))
            }
        }
    }
}

/// Additive relevance: +1 per keyword hit, +2 per topic term present in both
/// the entry and the current article.
fn score_entry(
    entry_text: &str,
    keywords: &[String],
    topic_terms: &[String],
    current_text: &str,
) -> u32 {
    let mut score = 0;
    for kw in keywords {
        if entry_text.contains(kw.as_str()) {
            score += 1;
        }
    }
    for term in topic_terms {
        if entry_text.contains(term.as_str()) && current_text.contains(term.as_str()) {
            score += 2;
        }
    }
    score
}

/// Page links have no summary; score on keyword hits in the anchor text.
fn score_link_text(text: &str, keywords: &[String]) -> u32 {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lowered.contains(kw.as_str()))
        .count() as u32
}

/// A feed entry pointing back at the article being analyzed is not related.
/// One-way containment catches tracking-parameter and trailing-slash
/// aliases without swallowing sibling URLs that share a prefix.
fn is_self_link(entry_link: &str, current: &str) -> bool {
    let entry = entry_link.trim_end_matches('/');
    let wanted = current.trim_end_matches('/');
    entry == wanted || entry.contains(wanted)
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
