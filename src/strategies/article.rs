//! Article-extraction-library strategy.
//!
//! Wraps the `readability` crate (Mozilla's readability algorithm) behind
//! the strategy interface. Empirically the most robust strategy against
//! bot-blocking markup, so the chain tries it first when fallbacks are
//! enabled. Compiled in by default via the `readability` feature.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::EngineConfig;
use crate::error::FetchError;
use crate::models::{FetchMethod, FetchedArticle};
use crate::strategies::FetchStrategy;

/// Fetches the page and hands the markup to the readability extractor.
pub struct ArticleExtractorStrategy {
    client: Client,
    config: Arc<EngineConfig>,
}

impl ArticleExtractorStrategy {
    pub fn new(client: Client, config: Arc<EngineConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl FetchStrategy for ArticleExtractorStrategy {
    fn name(&self) -> &'static str {
        "article_extractor"
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => return Err(FetchError::Blocked { status: status.as_u16() }),
            404 => return Err(FetchError::NotFound),
            s if !status.is_success() => return Err(FetchError::HttpStatus { status: s }),
            _ => {}
        }

        let html = response.text().await.map_err(FetchError::from_transport)?;

        let mut cursor = Cursor::new(html.into_bytes());
        let product = readability::extractor::extract(&mut cursor, url)
            .map_err(|e| FetchError::Transport(format!("readability failed: {e}")))?;

        let content = product.text.trim().to_string();
        if content.len() < self.config.thresholds.absolute_floor {
            return Err(FetchError::InsufficientContent);
        }
        debug!(bytes = content.len(), "Readability extraction succeeded");

        let title = product.title.trim();
        let title = (!title.is_empty()).then(|| title.to_string());

        Ok(FetchedArticle {
            url: url.to_string(),
            title,
            content,
            method: FetchMethod::ArticleExtractor,
            warning: None,
        })
    }
}
