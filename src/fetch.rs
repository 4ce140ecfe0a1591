//! The layered fetch chain.
//!
//! [`Fetcher`] owns an ordered list of [`FetchStrategy`] implementations and
//! tries them until one clears its acceptance floor:
//!
//! 1. Article extractor (readability): most robust, tried first
//! 2. Direct HTTP + selector cascade: the workhorse
//! 3. RSS feed lookup: summary text, lower floor
//! 4. Headless browser: rendered DOM, only when compiled in and Chrome exists
//!
//! Chain rules:
//! - HTTP 404 is terminal: no fallback can find a missing resource.
//! - A result below the strategy's floor is held as a partial and only
//!   returned if nothing later does better.
//! - When every strategy fails, the surfaced error is the first HTTP
//!   diagnosis (401/403/404/other status) seen, not whatever the last
//!   fallback happened to die of; the status code is the useful fact.

use std::sync::Arc;

use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::EngineConfig;
use crate::error::FetchError;
use crate::models::FetchedArticle;
#[cfg(feature = "readability")]
use crate::strategies::article::ArticleExtractorStrategy;
#[cfg(feature = "headless")]
use crate::strategies::browser::BrowserStrategy;
use crate::strategies::direct::DirectStrategy;
use crate::strategies::feed::FeedStrategy;
use crate::strategies::FetchStrategy;

/// Runs the strategy chain for article URLs.
pub struct Fetcher {
    direct: Arc<DirectStrategy>,
    chain: Vec<Arc<dyn FetchStrategy>>,
    config: Arc<EngineConfig>,
}

impl Fetcher {
    /// Assemble the chain, filtering out strategies that report themselves
    /// unavailable. The attempt order is fixed from here on.
    pub fn new(client: Client, config: Arc<EngineConfig>) -> Self {
        let direct = Arc::new(DirectStrategy::new(client.clone(), Arc::clone(&config)));

        let mut chain: Vec<Arc<dyn FetchStrategy>> = Vec::new();
        #[cfg(feature = "readability")]
        chain.push(Arc::new(ArticleExtractorStrategy::new(
            client.clone(),
            Arc::clone(&config),
        )));
        chain.push(Arc::clone(&direct) as Arc<dyn FetchStrategy>);
        chain.push(Arc::new(FeedStrategy::new(client, Arc::clone(&config))));
        #[cfg(feature = "headless")]
        chain.push(Arc::new(BrowserStrategy::new(Arc::clone(&config))));

        chain.retain(|s| {
            let available = s.is_available();
            if !available {
                info!(strategy = s.name(), "Strategy unavailable, skipping");
            }
            available
        });

        Self { direct, chain, config }
    }

    /// Fetch an article, walking the fallback chain unless `use_fallbacks`
    /// is off (secondary fetches inside related-article analysis stay cheap
    /// and direct-only).
    #[instrument(level = "info", skip_all, fields(%url, fallbacks = use_fallbacks))]
    pub async fn fetch(
        &self,
        url: &Url,
        use_fallbacks: bool,
    ) -> Result<FetchedArticle, FetchError> {
        if !use_fallbacks {
            return self.direct.fetch(url).await;
        }

        let thresholds = &self.config.thresholds;
        let mut best_partial: Option<FetchedArticle> = None;
        let mut diagnosis: Option<FetchError> = None;
        let mut last_error: Option<FetchError> = None;

        for strategy in &self.chain {
            match strategy.fetch(url).await {
                Ok(article) => {
                    let len = article.content_length();
                    if len >= strategy.accept_floor(thresholds) {
                        info!(strategy = strategy.name(), chars = len, "Fetch succeeded");
                        return Ok(article);
                    }
                    warn!(
                        strategy = strategy.name(),
                        chars = len,
                        "Result below acceptance floor, holding as partial"
                    );
                    let better = best_partial
                        .as_ref()
                        .is_none_or(|b| len > b.content_length());
                    if better {
                        best_partial = Some(article);
                    }
                }
                Err(e) if e.is_terminal() => {
                    info!(strategy = strategy.name(), "Resource does not exist, stopping");
                    return Err(e);
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Strategy failed");
                    if diagnosis.is_none()
                        && matches!(
                            e,
                            FetchError::Blocked { .. } | FetchError::HttpStatus { .. }
                        )
                    {
                        diagnosis = Some(e);
                    } else {
                        last_error = Some(e);
                    }
                }
            }
        }

        if let Some(partial) = best_partial {
            info!(chars = partial.content_length(), "Returning best partial result");
            return Ok(partial);
        }
        Err(diagnosis
            .or(last_error)
            .unwrap_or(FetchError::InsufficientContent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Minimal canned-response HTTP server for exercising the chain.
    async fn spawn_fixture(routes: HashMap<&'static str, (u16, &'static str, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();
                    let (status, content_type, body) = routes
                        .get(path.as_str())
                        .cloned()
                        .unwrap_or((404, "text/plain", "not found".to_string()));
                    let reason = match status {
                        200 => "OK",
                        403 => "Forbidden",
                        _ => "Not Found",
                    };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn article_html() -> String {
        let body = "This is a long, substantive paragraph of article text that easily \
                    clears every extraction threshold in the cascade because it keeps \
                    going on and on about the subject matter at considerable length."
            .repeat(2);
        format!(
            "<html><head><title>Fixture Story</title></head><body><article><p>{body}</p></article></body></html>"
        )
    }

    fn feed_xml(article_url: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel>
<title>Fixture Feed</title><link>https://example.com</link><description>d</description>
<item><title>Fixture Story</title><link>{article_url}</link>
<description>A summary of the fixture story with enough characters to clear the feed acceptance floor comfortably.</description></item>
</channel></rss>"#
        )
    }

    fn make_fetcher() -> Fetcher {
        let client = Client::new();
        let config = Arc::new(EngineConfig::default());
        Fetcher::new(client, config)
    }

    #[tokio::test]
    async fn test_direct_only_fetch_succeeds() {
        init_tracing();
        let mut routes = HashMap::new();
        routes.insert("/story", (200, "text/html", article_html()));
        let base = spawn_fixture(routes).await;

        let fetcher = make_fetcher();
        let url = Url::parse(&format!("{base}/story")).unwrap();
        let article = fetcher.fetch(&url, false).await.unwrap();
        assert!(article.content_length() > 150);
        assert_eq!(article.title.as_deref(), Some("Fixture Story"));
    }

    #[tokio::test]
    async fn test_blocked_page_falls_back_to_feed() {
        init_tracing();
        // The feed body must embed the server's own address, so bind first
        // and build the routes by hand.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = format!("http://{addr}");
        let article_url = format!("{base}/story");
        let feed_body = feed_xml(&article_url);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { break };
                let feed_body = feed_body.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, reason, body) = if path == "/feed" {
                        (200, "OK", feed_body.clone())
                    } else if path == "/story" {
                        (403, "Forbidden", "denied".to_string())
                    } else {
                        (404, "Not Found", "nope".to_string())
                    };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        let fetcher = make_fetcher();
        let url = Url::parse(&article_url).unwrap();
        let article = fetcher.fetch(&url, true).await.unwrap();
        assert_eq!(article.method, crate::models::FetchMethod::RssFeed);
        assert!(article.warning.is_some());
        assert!(article.content.contains("summary of the fixture story"));
    }

    #[tokio::test]
    async fn test_all_strategies_blocked_surfaces_status() {
        init_tracing();
        let mut routes = HashMap::new();
        routes.insert("/story", (403, "text/html", "denied".to_string()));
        let base = spawn_fixture(routes).await;

        let fetcher = make_fetcher();
        let url = Url::parse(&format!("{base}/story")).unwrap();
        let err = fetcher.fetch(&url, true).await.unwrap_err();
        assert!(err.to_string().contains("403"), "got: {err}");
        assert!(err.suggestion().is_some());
    }

    #[tokio::test]
    async fn test_not_found_is_terminal_no_fallbacks_tried() {
        init_tracing();
        let base = spawn_fixture(HashMap::new()).await;

        let fetcher = make_fetcher();
        let url = Url::parse(&format!("{base}/missing")).unwrap();
        let err = fetcher.fetch(&url, true).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
    }

    #[tokio::test]
    async fn test_fetch_is_idempotent_for_static_content() {
        init_tracing();
        let mut routes = HashMap::new();
        routes.insert("/story", (200, "text/html", article_html()));
        let base = spawn_fixture(routes).await;

        let fetcher = make_fetcher();
        let url = Url::parse(&format!("{base}/story")).unwrap();
        let first = fetcher.fetch(&url, false).await.unwrap();
        let second = fetcher.fetch(&url, false).await.unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first.method, second.method);
    }
}
