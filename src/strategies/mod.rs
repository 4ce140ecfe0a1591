//! Pluggable content-fetch strategies.
//!
//! Each strategy is one self-contained way of acquiring article content:
//!
//! | Strategy | Module | Method | Notes |
//! |----------|--------|--------|-------|
//! | Article extractor | [`article`] | readability | Most robust against bot-blocking; tried first |
//! | Direct HTTP | [`direct`] | reqwest + selector cascade | The workhorse; only strategy used for secondary fetches |
//! | RSS feed | [`feed`] | conventional feed paths | Summary text only, lower acceptance bar |
//! | Headless browser | [`browser`] | headless_chrome | Optional `headless` feature; rendered-DOM extraction |
//!
//! A strategy never lets an error escape as a panic: every internal failure
//! becomes a [`FetchError`] so the chain can move on to the next strategy.
//! Availability is declared up front via [`FetchStrategy::is_available`] and
//! the chain filters on it once at construction, so the attempt order is
//! deterministic for the lifetime of a fetcher.

use async_trait::async_trait;
use url::Url;

use crate::config::Thresholds;
use crate::error::FetchError;
use crate::models::FetchedArticle;

#[cfg(feature = "readability")]
pub mod article;
pub mod direct;
pub mod feed;

#[cfg(feature = "headless")]
pub mod browser;

/// One self-contained method of retrieving article content.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Stable strategy name, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this strategy can run at all in this build/environment.
    ///
    /// Checked once when the chain is assembled, not per call.
    fn is_available(&self) -> bool {
        true
    }

    /// Content length this strategy must clear for the chain to stop.
    ///
    /// RSS overrides this downward: a feed summary is not full text.
    fn accept_floor(&self, t: &Thresholds) -> usize {
        t.chain_accept
    }

    /// Attempt to fetch and extract the article at `url`.
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError>;
}
