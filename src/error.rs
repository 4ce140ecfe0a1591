//! Error taxonomy for the fetch chain and best-effort sub-features.
//!
//! Every failure is a returned value; nothing in this crate lets an error
//! cross a component boundary as a panic. The fetch chain absorbs
//! per-strategy errors and surfaces only the final terminal one; the
//! related-article and comparison paths degrade to typed
//! [`Degradation`] records instead of raising.

use thiserror::Error;

/// Why a fetch attempt (or the whole chain) failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 401/403: the origin denies automated access.
    #[error("{status} {}: access denied by the origin", status_phrase(*.status))]
    Blocked {
        /// The HTTP status code (401 or 403).
        status: u16,
    },

    /// HTTP 404: terminal, no fallback will find a missing resource.
    #[error("404 Not Found: the article URL doesn't exist or has been removed")]
    NotFound,

    /// Any other non-success HTTP status.
    #[error("HTTP error {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The request timed out.
    #[error("request timed out; the website may be slow or unreachable")]
    Timeout,

    /// DNS or connection failure.
    #[error("connection error; the host may be unreachable")]
    Connection,

    /// All structural heuristics found less content than the absolute floor.
    #[error("could not extract sufficient content; the page structure may not be supported")]
    InsufficientContent,

    /// The strategy's backing library is not compiled in or unusable.
    #[error("strategy unavailable: {name}")]
    StrategyUnavailable {
        /// The strategy that was asked for.
        name: &'static str,
    },

    /// Underlying transport error that is neither a timeout nor a refusal.
    #[error("request failed: {0}")]
    Transport(String),

    /// A URL could not be parsed or resolved.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn status_phrase(status: u16) -> &'static str {
    match status {
        401 => "Unauthorized",
        403 => "Forbidden",
        _ => "Blocked",
    }
}

impl FetchError {
    /// Actionable remediation hint for surfacing alongside the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            FetchError::Blocked { .. } => Some(
                "This site blocks automated access. Options: enable the headless browser \
                 strategy, check for an RSS feed, or paste the article content manually.",
            ),
            FetchError::InsufficientContent => Some(
                "Try pasting the article content manually, enable the headless browser \
                 strategy, or use a different news source.",
            ),
            FetchError::Timeout | FetchError::Connection => {
                Some("Check connectivity and retry; the origin may be rate limiting.")
            }
            _ => None,
        }
    }

    /// Not-Found is the one failure class no other strategy can recover from.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchError::NotFound)
    }

    /// Classify a transport-level `reqwest` error.
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connection
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// A best-effort sub-operation that degraded instead of failing the request.
///
/// Inspectable replacement for swallow-all exception handling: tests and
/// callers can assert on *why* a source yielded nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// The discovery deadline expired before this source ran (or finished).
    DeadlineExpired,
    /// A feed path or page fetch failed over the network.
    Network(String),
    /// A feed or page body could not be parsed.
    Parse(String),
}
