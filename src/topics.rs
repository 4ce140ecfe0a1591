//! Word-token extraction and set-based topic comparison.
//!
//! A "topic set" is a crude lexical proxy for semantic overlap: the set of
//! lowercase word-tokens above a minimum length. Title tokens use a lower
//! minimum (4) than body/summary tokens (5) because headlines compress.
//! Topic sets are ephemeral, recomputed per comparison and never persisted.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::TopicComparison;

/// Minimum token length for title text.
pub const TITLE_TOKEN_MIN: usize = 4;
/// Minimum token length for body/summary text.
pub const BODY_TOKEN_MIN: usize = 5;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Lowercase word-tokens of at least `min_len` characters.
///
/// Returned as a `BTreeSet` so downstream caps and list conversions are
/// deterministic (required for stable ordering guarantees).
pub fn tokens(text: &str, min_len: usize) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.chars().count() >= min_len)
        .collect()
}

/// Char-boundary-safe prefix of at most `n` characters.
pub fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Query keywords for related-article search: title tokens (≥4 chars)
/// unioned with tokens from the first 500 chars of content (≥5 chars),
/// capped at `max` keywords.
pub fn keywords(title: &str, content: &str, max: usize) -> Vec<String> {
    let mut set = tokens(title, TITLE_TOKEN_MIN);
    set.extend(tokens(prefix_chars(content, 500), BODY_TOKEN_MIN));
    set.into_iter().take(max).collect()
}

/// Intersection/difference topic comparison over the first 1000 chars of
/// each text, with each list capped at `cap` entries.
///
/// Sentence-level deltas are the comparator's job; this fills only the topic
/// lists.
pub fn compare_topics(current: &str, related: &str, cap: usize) -> TopicComparison {
    let current_topics = tokens(prefix_chars(current, 1000), BODY_TOKEN_MIN);
    let related_topics = tokens(prefix_chars(related, 1000), BODY_TOKEN_MIN);

    let common_topics = current_topics
        .intersection(&related_topics)
        .take(cap)
        .cloned()
        .collect();
    let topics_only_in_related = related_topics
        .difference(&current_topics)
        .take(cap)
        .cloned()
        .collect();
    let topics_only_in_current = current_topics
        .difference(&related_topics)
        .take(cap)
        .cloned()
        .collect();

    TopicComparison {
        common_topics,
        topics_only_in_related,
        topics_only_in_current,
        unique_related_sentences: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_lowercase_and_filter_by_length() {
        let set = tokens("Modi visits Moscow for big trade talks", 4);
        assert!(set.contains("modi"));
        assert!(set.contains("moscow"));
        assert!(set.contains("talks"));
        assert!(!set.contains("for"));
        assert!(!set.contains("big"));
    }

    #[test]
    fn test_tokens_body_minimum_drops_four_letter_words() {
        let set = tokens("Modi visits Moscow", BODY_TOKEN_MIN);
        assert!(!set.contains("modi"));
        assert!(set.contains("visits"));
        assert!(set.contains("moscow"));
    }

    #[test]
    fn test_prefix_chars_respects_boundaries() {
        assert_eq!(prefix_chars("héllo wörld", 5), "héllo");
        assert_eq!(prefix_chars("short", 100), "short");
    }

    #[test]
    fn test_keywords_union_and_cap() {
        let kws = keywords(
            "Economic policy shakeup announced",
            "The government published details of sweeping reforms affecting citizens across several states.",
            10,
        );
        assert!(kws.len() <= 10);
        assert!(kws.contains(&"policy".to_string()));
        assert!(kws.contains(&"government".to_string()));
        // Deterministic: same inputs, same output order.
        let again = keywords(
            "Economic policy shakeup announced",
            "The government published details of sweeping reforms affecting citizens across several states.",
            10,
        );
        assert_eq!(kws, again);
    }

    #[test]
    fn test_compare_topics_partitions() {
        let cmp = compare_topics(
            "india signed the trade agreement yesterday",
            "russia signed the energy agreement today",
            5,
        );
        assert!(cmp.common_topics.contains(&"signed".to_string()));
        assert!(cmp.common_topics.contains(&"agreement".to_string()));
        assert!(cmp.topics_only_in_related.contains(&"russia".to_string()));
        assert!(cmp.topics_only_in_current.contains(&"india".to_string()));
        assert!(cmp.unique_related_sentences.is_empty());
    }

    #[test]
    fn test_compare_topics_lists_capped_at_five() {
        let current = "alpha bravo charlie deltaa echoo foxtrot golff hotell indiaa juliet";
        let related = "kiloo limaa mikee november oscarr papaa quebec romeoo sierra tangoo";
        let cmp = compare_topics(current, related, 5);
        assert_eq!(cmp.topics_only_in_current.len(), 5);
        assert_eq!(cmp.topics_only_in_related.len(), 5);
        assert!(cmp.common_topics.is_empty());
    }
}
