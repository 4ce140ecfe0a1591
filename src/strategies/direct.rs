//! Direct HTTP fetch plus the selector-cascade extractor.
//!
//! This is the strategy behind `method = "direct_http"`: a plain GET with
//! browser-like headers, charset handling, and the heuristic extraction
//! cascade from [`crate::extract`]. HTTP 401/403/404 short-circuit
//! extraction entirely and map to distinct error classes so the chain can
//! decide which fallbacks are worth trying.

use std::sync::Arc;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::EngineConfig;
use crate::error::FetchError;
use crate::extract;
use crate::models::FetchedArticle;
use crate::strategies::FetchStrategy;

/// Fetches the page with the shared client and runs heuristic extraction.
pub struct DirectStrategy {
    client: Client,
    config: Arc<EngineConfig>,
}

impl DirectStrategy {
    pub fn new(client: Client, config: Arc<EngineConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct_http"
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

        let declared_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_label);
        let bytes = response.bytes().await.map_err(FetchError::from_transport)?;
        let html = decode_body(&bytes, declared_charset.as_deref());
        debug!(bytes = bytes.len(), charset = ?declared_charset, "Fetched page body");

        extract::extract(&html, url, &self.config.thresholds)
    }
}

static META_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([a-zA-Z0-9_\-]+)"#).unwrap());

fn charset_label(content_type: &str) -> Option<String> {
    META_CHARSET
        .captures(content_type)
        .map(|c| c[1].to_string())
}

/// Decode the body, sniffing when the server omits the charset or declares
/// the ISO-8859-1 placeholder default.
fn decode_body(bytes: &[u8], declared: Option<&str>) -> String {
    let label = match declared {
        Some(cs) if !cs.eq_ignore_ascii_case("iso-8859-1") => Some(cs.to_string()),
        _ => sniff_meta_charset(bytes).or(declared.map(str::to_string)),
    };

    let encoding = label
        .and_then(|l| Encoding::for_label(l.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Look for a `<meta charset>` declaration in the document head.
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(1024)];
    let probe = String::from_utf8_lossy(head);
    META_CHARSET.captures(&probe).map(|c| c[1].to_string())
}
