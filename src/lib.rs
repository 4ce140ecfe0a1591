//! Content acquisition and cross-reference engine for news articles.
//!
//! Given an article URL, this crate fetches and extracts the article text
//! through a layered fallback chain, discovers related articles on the same
//! site, and produces set-based topic comparisons between the original and
//! each related piece.
//!
//! # Pipeline
//!
//! ```text
//! URL ──► fetch chain ──► FetchedArticle ──► related discovery ──► scoring
//!                                                   │
//!                                                   ▼
//!                                   per-candidate comparison ──► report
//! ```
//!
//! # Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | Tunable thresholds, timeouts, and the header block |
//! | [`error`] | The fetch-error taxonomy and degradation records |
//! | [`models`] | Value objects flowing through the pipeline |
//! | [`extract`] | Heuristic HTML title/content extraction cascade |
//! | [`strategies`] | Pluggable fetch strategies (direct, readability, RSS, browser) |
//! | [`fetch`] | The ordered fallback chain over the strategies |
//! | [`related`] | Same-site related-article discovery and scoring |
//! | [`topics`] | Word-token extraction and topic-set comparison |
//! | [`compare`] | Per-candidate cross-reference analysis |
//! | [`analysis`] | Downstream analysis seam with retry/backoff |
//! | [`engine`] | The facade wiring it all together |
//!
//! # Quick Start
//!
//! ```no_run
//! use news_scout::{Engine, EngineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(EngineConfig::default())?;
//! let (article, report) = engine
//!     .fetch_and_cross_reference("https://example.com/news/story")
//!     .await?;
//! println!("{} chars via {}", article.content_length(), article.method);
//! println!("{} related articles", report.total_found);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod related;
pub mod strategies;
pub mod topics;

pub use config::{EngineConfig, Thresholds};
pub use engine::Engine;
pub use error::{Degradation, FetchError};
pub use fetch::Fetcher;
pub use models::{
    CandidateAnalysis, CandidateSource, FetchMethod, FetchedArticle, RelatedArticleReport,
    RelatedCandidate, TopicComparison,
};
pub use related::{Deadline, RelatedFinder, RelatedSearch, DEFAULT_MAX_RESULTS};
