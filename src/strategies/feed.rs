//! RSS-feed fallback strategy.
//!
//! When a site blocks direct page access it often still serves its feed.
//! This strategy probes the conventional feed paths on the article's origin
//! and looks for an entry whose link matches the requested URL; the entry's
//! summary then stands in for the article body. Summaries are short, so the
//! strategy advertises a lower acceptance floor than the page strategies.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use rss::Channel;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{EngineConfig, Thresholds};
use crate::error::FetchError;
use crate::models::{FetchMethod, FetchedArticle};
use crate::strategies::FetchStrategy;

/// Entries scanned per feed when looking for the requested article itself.
const SELF_LOOKUP_SCAN: usize = 10;

/// Looks the requested article up in the origin's own feeds.
pub struct FeedStrategy {
    client: Client,
    config: Arc<EngineConfig>,
}

impl FeedStrategy {
    pub fn new(client: Client, config: Arc<EngineConfig>) -> Self {
        Self { client, config }
    }

    /// Fetch and parse one feed path; `None` for any network or parse miss.
    ///
    /// Feed probing is best-effort by nature: most of the conventional paths
    /// will 404 on any given site.
    async fn load_channel(&self, feed_url: &Url) -> Option<Channel> {
        let response = self.client.get(feed_url.clone()).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let bytes = response.bytes().await.ok()?;
        Channel::read_from(&bytes[..]).ok()
    }
}

#[async_trait]
impl FetchStrategy for FeedStrategy {
    fn name(&self) -> &'static str {
        "rss_feed"
    }

    fn accept_floor(&self, t: &Thresholds) -> usize {
        t.rss_accept
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError> {
        let origin = origin_of(url)?;

        for path in &self.config.feed_paths {
            let feed_url = origin.join(path)?;
            let Some(channel) = self.load_channel(&feed_url).await else {
                continue;
            };
            debug!(feed = %feed_url, items = channel.items().len(), "Parsed feed");

            for item in channel.items().iter().take(SELF_LOOKUP_SCAN) {
                let Some(link) = item.link() else { continue };
                if !links_match(link, url.as_str()) {
                    continue;
                }

                let summary = item
                    .description()
                    .map(|d| d.trim().to_string())
                    .unwrap_or_default();
                if summary.len() < self.config.thresholds.absolute_floor {
                    continue;
                }

                return Ok(FetchedArticle {
                    url: url.to_string(),
                    title: item.title().map(|t| t.trim().to_string()),
                    content: summary,
                    method: FetchMethod::RssFeed,
                    warning: Some(
                        "Content from RSS summary - may be incomplete".to_string(),
                    ),
                });
            }
        }

        Err(FetchError::InsufficientContent)
    }
}

/// The scheme+host root of a URL, as a joinable base.
fn origin_of(url: &Url) -> Result<Url, FetchError> {
    let origin = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    Ok(Url::parse(&origin)?)
}

/// Feed links rarely match the requested URL byte for byte (tracking
/// parameters, trailing slashes), so containment either way counts.
fn links_match(entry_link: &str, requested: &str) -> bool {
    let entry = entry_link.trim_end_matches('/');
    let wanted = requested.trim_end_matches('/');
    entry == wanted || entry.contains(wanted) || wanted.contains(entry)
}
