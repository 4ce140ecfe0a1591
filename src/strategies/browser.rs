//! Headless-browser last-resort strategy.
//!
//! Drives a real Chrome/Chromium via `headless_chrome` for sites whose
//! markup only materializes after JavaScript runs. Compiled in only with
//! the `headless` feature, and reported unavailable when no Chrome binary
//! can be located, so the chain skips it cleanly on minimal hosts.
//!
//! The whole interaction is synchronous CDP work, so it runs on the
//! blocking pool; the browser is torn down when the scope ends.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::EngineConfig;
use crate::error::FetchError;
use crate::extract;
use crate::models::{FetchMethod, FetchedArticle};
use crate::strategies::FetchStrategy;

/// Consent-banner button texts tried, in order, before reading the DOM.
const CONSENT_LABELS: [&str; 3] = ["Accept", "Close", "×"];

/// Renders the page in headless Chrome and extracts from the final DOM.
pub struct BrowserStrategy {
    config: Arc<EngineConfig>,
}

impl BrowserStrategy {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FetchStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "headless_browser"
    }

    fn is_available(&self) -> bool {
        headless_chrome::browser::default_executable().is_ok()
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedArticle, FetchError> {
        let config = Arc::clone(&self.config);
        let url = url.clone();

        tokio::task::spawn_blocking(move || render_and_extract(&url, &config))
            .await
            .map_err(|e| FetchError::Transport(format!("browser task failed: {e}")))?
    }
}

fn render_and_extract(url: &Url, config: &EngineConfig) -> Result<FetchedArticle, FetchError> {
    if headless_chrome::browser::default_executable().is_err() {
        return Err(FetchError::StrategyUnavailable { name: "headless_browser" });
    }
    let options = LaunchOptions::default_builder()
        .headless(true)
        .build()
        .map_err(|e| FetchError::Transport(format!("browser launch options: {e}")))?;
    let browser =
        Browser::new(options).map_err(|e| FetchError::Transport(format!("browser launch: {e}")))?;
    let tab = browser
        .new_tab()
        .map_err(|e| FetchError::Transport(format!("browser tab: {e}")))?;

    tab.navigate_to(url.as_str())
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| FetchError::Transport(format!("navigation failed: {e}")))?;

    dismiss_consent_banners(&tab);
    thread::sleep(config.browser_settle);

    let html = tab
        .get_content()
        .map_err(|e| FetchError::Transport(format!("dom read failed: {e}")))?;
    debug!(bytes = html.len(), "Read rendered DOM");

    let mut article = extract::extract(&html, url, &config.thresholds)?;
    article.method = FetchMethod::HeadlessBrowser;
    article.warning = None;
    if article.content.len() > config.thresholds.browser_content_cap {
        article.content.truncate(floor_char_boundary(
            &article.content,
            config.thresholds.browser_content_cap,
        ));
    }
    Ok(article)
}

/// Click through up to one of each known consent/overlay button.
///
/// Failures here are expected (most pages have no banner) and never abort
/// the fetch; a short pause follows each click so the overlay can animate
/// out before the next probe.
fn dismiss_consent_banners(tab: &headless_chrome::Tab) {
    for label in CONSENT_LABELS {
        let xpath = format!(
            "//button[contains(text(), '{label}')] | //a[contains(text(), '{label}')]"
        );
        match tab.find_element_by_xpath(&xpath) {
            Ok(element) => {
                if let Err(e) = element.click() {
                    warn!(label, error = %e, "Consent button found but click failed");
                }
                thread::sleep(Duration::from_secs(1));
            }
            Err(_) => continue,
        }
    }
}

/// Largest index `<= max` that falls on a char boundary.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_char_boundary_on_multibyte() {
        let s = "caf\u{e9} au lait";
        // Index 4 would split the two-byte 'é'.
        assert_eq!(floor_char_boundary(s, 4), 3);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_consent_labels_cover_common_banners() {
        assert_eq!(CONSENT_LABELS.len(), 3);
        assert!(CONSENT_LABELS.contains(&"Accept"));
    }
}
