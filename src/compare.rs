//! Per-candidate cross-reference analysis.
//!
//! For each discovered candidate the comparator makes one best-effort,
//! direct-only fetch of the candidate's full text (no fallback chain, so
//! secondary fetches stay cheap), falls back to the feed summary when that
//! fails, and produces set-based topic deltas plus a handful of sentences
//! the related article covers that the current one does not.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use crate::config::EngineConfig;
use crate::fetch::Fetcher;
use crate::models::{
    CandidateAnalysis, FetchedArticle, RelatedArticleReport, RelatedCandidate,
};
use crate::related::Deadline;
use crate::topics;

/// Words that mark a sentence as substantive enough to surface.
const SUBSTANTIVE_KEYWORDS: [&str; 7] = [
    "policy", "security", "impact", "citizen", "government", "cost", "benefit",
];

/// Minimum sentence length considered for the unique-sentence delta.
const MIN_SENTENCE_LEN: usize = 50;
/// Prefix length used to decide two sentences cover the same ground.
const PREFIX_MATCH_LEN: usize = 50;
/// Display cap per surfaced sentence.
const SENTENCE_DISPLAY_CAP: usize = 150;
/// Display cap for candidate summaries.
const SUMMARY_DISPLAY_CAP: usize = 200;

/// Turns scored candidates into a full cross-reference report.
pub struct Comparator {
    fetcher: Arc<Fetcher>,
    config: Arc<EngineConfig>,
}

impl Comparator {
    pub fn new(fetcher: Arc<Fetcher>, config: Arc<EngineConfig>) -> Self {
        Self { fetcher, config }
    }

    /// Analyze every candidate against the current article.
    ///
    /// Candidate bodies are fetched one at a time (stop-at-first-success has
    /// no meaning here, but bounded cost does; each fetch carries its own
    /// network timeout). Candidates the deadline cuts off are compared on
    /// their summary alone, exactly as if their full fetch had failed.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub async fn analyze(
        &self,
        current: &FetchedArticle,
        candidates: Vec<RelatedCandidate>,
        deadline: Deadline,
    ) -> RelatedArticleReport {
        if candidates.is_empty() {
            return RelatedArticleReport::none_found(
                "No related articles found on the same site",
            );
        }

        let mut articles = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let fetched = if deadline.expired() {
                debug!(url = %candidate.url, "Deadline expired, comparing on summary only");
                None
            } else {
                self.fetch_candidate(&candidate.url).await
            };
            articles.push(self.analyze_one(current, candidate, fetched));
        }

        info!(analyzed = articles.len(), "Cross-reference analysis complete");
        RelatedArticleReport {
            related_articles_found: true,
            total_found: articles.len(),
            articles,
            message: None,
        }
    }

    /// Direct-only fetch; any failure degrades to summary comparison.
    async fn fetch_candidate(&self, url: &str) -> Option<FetchedArticle> {
        let parsed = Url::parse(url).ok()?;
        match self.fetcher.fetch(&parsed, false).await {
            Ok(article) => Some(article),
            Err(e) => {
                debug!(%url, error = %e, "Candidate fetch failed, using summary");
                None
            }
        }
    }

    fn analyze_one(
        &self,
        current: &FetchedArticle,
        candidate: RelatedCandidate,
        fetched: Option<FetchedArticle>,
    ) -> CandidateAnalysis {
        let t = &self.config.thresholds;

        // Topic deltas always run on the summary: it is what discovery
        // scored, and it keeps the comparison stable whether or not the
        // full fetch worked. The sentence delta needs real body text, so
        // it only runs when the fetch succeeded.
        let mut comparison =
            topics::compare_topics(&current.content, &candidate.summary, t.max_topics);
        let (full_content_available, content_length) = match &fetched {
            Some(article) => {
                comparison.unique_related_sentences = unique_sentences(
                    &article.content,
                    &current.content,
                    t.max_unique_sentences,
                );
                (true, Some(article.content_length()))
            }
            None => (false, None),
        };

        CandidateAnalysis {
            url: candidate.url,
            title: candidate.title,
            relevance_score: candidate.relevance_score,
            summary: truncate_chars(&candidate.summary, SUMMARY_DISPLAY_CAP),
            comparison,
            full_content_available,
            content_length,
        }
    }
}

/// Sentences in `related` with no counterpart in `current`.
///
/// A sentence counts when it is long enough to carry a claim, its leading
/// 50 chars appear nowhere in the current text, and it mentions at least
/// one substantive keyword. Output is capped and display-truncated.
fn unique_sentences(related: &str, current: &str, cap: usize) -> Vec<String> {
    let current_lower = current.to_lowercase();
    related
        .split('.')
        .map(str::trim)
        .filter(|s| s.len() > MIN_SENTENCE_LEN)
        .filter(|s| {
            let prefix = topics::prefix_chars(s, PREFIX_MATCH_LEN).to_lowercase();
            !current_lower.contains(&prefix)
        })
        .filter(|s| {
            let lowered = s.to_lowercase();
            SUBSTANTIVE_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        })
        .map(|s| truncate_chars(s, SENTENCE_DISPLAY_CAP))
        .take(cap)
        .collect()
}

/// Char-boundary-safe display truncation.
fn truncate_chars(s: &str, cap: usize) -> String {
    topics::prefix_chars(s, cap).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = "The government announced a sweeping trade policy during the state \
                           visit. Officials said negotiations had lasted several months.";

    #[test]
    fn test_unique_sentence_surfaced_when_substantive_and_new() {
        let related = "The new policy is expected to impact millions of citizens across both \
                       countries according to early estimates. The weather was pleasant.";
        let unique = unique_sentences(related, CURRENT, 3);
        assert_eq!(unique.len(), 1);
        assert!(unique[0].contains("impact millions of citizens"));
    }

    #[test]
    fn test_sentence_shared_prefix_is_not_unique() {
        let related = "The government announced a sweeping trade policy during the state visit \
                       to widespread approval.";
        let unique = unique_sentences(related, CURRENT, 3);
        assert!(unique.is_empty());
    }

    #[test]
    fn test_sentence_without_substantive_keyword_dropped() {
        let related = "The delegation enjoyed a lavish twelve-course banquet at the presidential \
                       palace before departing.";
        let unique = unique_sentences(related, CURRENT, 3);
        assert!(unique.is_empty());
    }

    #[test]
    fn test_unique_sentences_capped_and_truncated() {
        let related = "The security arrangements around the summit venue drew criticism from \
                       local residents and business owners alike. \
                       The economic impact of the agreement will be studied by independent \
                       analysts over the coming fiscal year and beyond. \
                       Government sources suggested the total cost of implementation could \
                       exceed early projections by a wide margin. \
                       The policy framework includes provisions for citizen oversight panels \
                       in every participating region of the country.";
        let unique = unique_sentences(related, CURRENT, 3);
        assert_eq!(unique.len(), 3);
        for s in &unique {
            assert!(s.chars().count() <= 150);
        }
    }

    #[test]
    fn test_short_sentences_ignored() {
        let related = "Policy shifted. Impact unclear.";
        assert!(unique_sentences(related, CURRENT, 3).is_empty());
    }

    #[test]
    fn test_truncate_chars_multibyte_safe() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
