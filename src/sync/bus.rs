//! Synchronous publish/subscribe fan-out
//!
//! Subscribers are called in attachment order on the publishing task.
//! A subscriber that errors or panics is logged and skipped; delivery to
//! the rest continues.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::model::ObservableEvent;

/// Anything that wants to hear about playback changes.
///
/// `handle` runs on the engine's task, so slow work (network I/O) should
/// be handed off to a worker owned by the subscriber.
pub trait Subscriber: Send + Sync {
    fn name(&self) -> &str;

    fn handle(&self, event: &ObservableEvent) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriberId, Arc<dyn Subscriber>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(subscriber = subscriber.name(), ?id, "Attaching subscriber");
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        id
    }

    /// Returns false when `id` was not attached.
    pub fn detach(&self, id: SubscriberId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::debug!(?id, "Detached subscriber");
        }
        removed
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to every subscriber and returns how many handled it
    /// without failing.
    pub fn publish(&self, event: &ObservableEvent) -> usize {
        // Snapshot so subscribers may attach/detach from inside `handle`.
        let subscribers: Vec<Arc<dyn Subscriber>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();

        tracing::debug!(kind = ?event.kind(), subscribers = subscribers.len(), "Publishing event");

        let mut delivered = 0;
        for subscriber in subscribers {
            match panic::catch_unwind(AssertUnwindSafe(|| subscriber.handle(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => tracing::warn!(
                    subscriber = subscriber.name(),
                    kind = ?event.kind(),
                    error = %e,
                    "Subscriber failed to handle event"
                ),
                Err(_) => tracing::error!(
                    subscriber = subscriber.name(),
                    kind = ?event.kind(),
                    "Subscriber panicked while handling event"
                ),
            }
        }
        delivered
    }
}
