//! Retry-After backoff for rate-limited source calls

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// Sleeps for the server-specified delay and retries the same fetch when
/// the source answers with [`SourceError::RateLimited`].
///
/// The sleep only suspends the calling task; readers of the engine state
/// are never blocked by it.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitBackoff {
    max_retries: u32,
    max_wait: Duration,
}

impl RateLimitBackoff {
    pub fn new(max_retries: u32, max_wait: Duration) -> Self {
        Self {
            max_retries,
            max_wait,
        }
    }

    /// Runs `fetch`, retrying on rate limits up to `max_retries` times.
    ///
    /// Any other outcome, success or failure, is returned as is. Running
    /// out of retries yields [`SourceError::Unavailable`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut fetch: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut retries = 0;
        loop {
            match fetch().await {
                Err(SourceError::RateLimited { retry_after }) => {
                    if retries >= self.max_retries {
                        tracing::warn!(
                            operation,
                            attempts = retries + 1,
                            "Still rate limited, giving up for this cycle"
                        );
                        return Err(SourceError::Unavailable {
                            attempts: retries + 1,
                        });
                    }
                    let wait = retry_after.min(self.max_wait);
                    tracing::warn!(
                        operation,
                        retry_after_secs = retry_after.as_secs(),
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    retries += 1;
                    tracing::info!(operation, retry = retries, "Backoff finished, retrying");
                }
                other => return other,
            }
        }
    }
}

impl Default for RateLimitBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_MAX_WAIT)
    }
}
