//! Error types for vesta-sync
//!
//! The source client reports a closed set of failure kinds so every call
//! site in the engine handles each of them explicitly.

use std::time::Duration;

/// Failures reported by a [`SourceClient`](crate::source::SourceClient).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// HTTP 429 from the source, carrying the server's Retry-After.
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Nothing is playing. A valid observation, not a fault.
    #[error("nothing is playing")]
    NotPlaying,

    #[error("access token expired")]
    TokenExpired,

    #[error("authentication error: {0}")]
    Auth(String),

    /// Network blip or an unexpected response. Skip the cycle.
    #[error("transient source error: {0}")]
    Transient(String),

    /// Still rate limited after the bounded number of retries.
    #[error("source unavailable after {attempts} rate-limited attempts")]
    Unavailable { attempts: u32 },
}

/// Failures talking to the Vestaboard APIs.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("board rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected compose response: {0}")]
    Compose(String),
}
