//! Recurring timer that drives [`SyncEngine::poll`]

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::{PollOutcome, SyncEngine};

/// Polls `engine` every `period` until the returned handle is aborted.
///
/// Ticks missed while a cycle sits in a rate-limit backoff are skipped
/// rather than replayed in a burst.
pub fn spawn_poller(engine: SyncEngine, period: Duration) -> JoinHandle<()> {
    tracing::info!(period_ms = period.as_millis() as u64, "Starting poller");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match engine.poll().await {
                PollOutcome::Changed(kind) => tracing::debug!(?kind, "Poll published a change"),
                outcome => tracing::trace!(?outcome, "Poll finished"),
            }
        }
    })
}
