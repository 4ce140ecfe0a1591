//! The top-level engine: owns the shared HTTP client and wires the fetch
//! chain, discovery, and comparison together.
//!
//! One [`Engine`] is built per configuration and reused across requests;
//! the underlying `reqwest` client pools connections, and the browser-like
//! header block is fixed on it at construction.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use crate::compare::Comparator;
use crate::config::EngineConfig;
use crate::error::{Degradation, FetchError};
use crate::fetch::Fetcher;
use crate::models::{FetchedArticle, RelatedArticleReport};
use crate::related::{Deadline, RelatedFinder};

/// Facade over the whole acquisition and cross-reference pipeline.
pub struct Engine {
    fetcher: Arc<Fetcher>,
    finder: RelatedFinder,
    comparator: Comparator,
    config: Arc<EngineConfig>,
}

impl Engine {
    /// Build an engine (and its shared HTTP client) from `config`.
    pub fn new(config: EngineConfig) -> Result<Self, FetchError> {
        let config = Arc::new(config);
        let client = build_client(&config)?;

        let fetcher = Arc::new(Fetcher::new(client.clone(), Arc::clone(&config)));
        let finder = RelatedFinder::new(client, Arc::clone(&config));
        let comparator = Comparator::new(Arc::clone(&fetcher), Arc::clone(&config));

        Ok(Self { fetcher, finder, comparator, config })
    }

    /// Fetch one article, walking the fallback chain unless told otherwise.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch_article(
        &self,
        url: &str,
        use_fallbacks: bool,
    ) -> Result<FetchedArticle, FetchError> {
        let parsed = Url::parse(url)?;
        self.fetcher.fetch(&parsed, use_fallbacks).await
    }

    /// Discover, score, and cross-reference related articles for `article`.
    ///
    /// The whole phase runs under the configured wall-clock budget; on
    /// expiry with nothing found, the report says so instead of failing.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn find_related(&self, article: &FetchedArticle) -> RelatedArticleReport {
        let url = match Url::parse(&article.url) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "Article URL no longer parses");
                return RelatedArticleReport::none_found(
                    "Related article search could not run: invalid article URL",
                );
            }
        };

        let deadline = Deadline::new(self.config.related_deadline);
        let title = article.title.as_deref().unwrap_or_default();
        let search = self
            .finder
            .discover(
                &url,
                title,
                &article.content,
                crate::related::DEFAULT_MAX_RESULTS,
                deadline,
            )
            .await;

        if search.candidates.is_empty() {
            let timed_out = search
                .degradations
                .iter()
                .any(|d| *d == Degradation::DeadlineExpired);
            return if timed_out {
                RelatedArticleReport::none_found("Related article search timed out")
            } else {
                RelatedArticleReport::none_found(
                    "No related articles found on the same site",
                )
            };
        }

        self.comparator
            .analyze(article, search.candidates, deadline)
            .await
    }

    /// Convenience: fetch the article, then cross-reference it.
    pub async fn fetch_and_cross_reference(
        &self,
        url: &str,
    ) -> Result<(FetchedArticle, RelatedArticleReport), FetchError> {
        let article = self.fetch_article(url, true).await?;
        info!(method = %article.method, chars = article.content_length(), "Article fetched");
        let report = self.find_related(&article).await;
        Ok((article, report))
    }
}

fn build_client(config: &EngineConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.default_headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::Transport(format!("bad header name: {e}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| FetchError::Transport(format!("bad header value: {e}")))?;
        headers.insert(name, value);
    }

    Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| FetchError::Transport(format!("client build failed: {e}")))
}
