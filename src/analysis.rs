//! Downstream analysis seam with exponential backoff retry logic.
//!
//! Fetched content is typically handed off to an external analysis backend
//! (summarization, bias scoring, whatever the deployment wires in). That
//! backend is remote and flaky by nature, so this module provides:
//! - [`AnalyzeAsync`]: the trait an analysis backend implements
//! - [`RetryAnalyze`]: a decorator adding retry with exponential backoff
//!   and jitter to any backend
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting from a configurable base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use rand::{rng, Rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// One article handed to an analysis backend.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Resolved article title, when extraction found one.
    pub title: Option<String>,
    /// The extracted article text.
    pub content: String,
    /// The article's URL, for provenance.
    pub url: String,
    /// Optional backend-specific ruleset or prompt-set identifier.
    pub ruleset: Option<String>,
}

/// Trait for async analysis backends.
///
/// Implementors send an [`AnalysisRequest`] somewhere and return whatever
/// the backend produces. Decorators like [`RetryAnalyze`] wrap any
/// implementation transparently.
pub trait AnalyzeAsync {
    /// The type of response returned by the backend.
    type Response;

    /// Submit the request and await the backend's response.
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Self::Response, Box<dyn Error>>;
}

/// Decorator that adds exponential backoff retry to any [`AnalyzeAsync`].
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAnalyze<T> {
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAnalyze<T>
where
    T: AnalyzeAsync,
{
    /// Wrap an existing backend with retry logic.
    ///
    /// 5 retries with a 1 second base delay is the recommended setting.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAnalyze<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAnalyze")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AnalyzeAsync for RetryAnalyze<T>
where
    T: AnalyzeAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.analyze(request).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "analyze() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "analyze() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
