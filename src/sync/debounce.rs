//! Leading-edge arm, trailing-edge fire debounce.
//!
//! The first `schedule` call in a quiet period arms a timer; calls made
//! while it is armed are dropped. The action reads whatever state is
//! current when the timer fires, so the dropped calls are still covered.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct Debouncer {
    pending: Arc<AtomicBool>,
    quiet_period: Duration,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
            quiet_period,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Arms the timer unless it is already armed. Returns whether this
    /// call armed it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, action: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("Push already pending, coalescing");
            return false;
        }

        let pending = Arc::clone(&self.pending);
        let quiet_period = self.quiet_period;
        tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            // Cleared before the action reads state: a change landing
            // mid-push arms a fresh timer instead of being lost.
            pending.store(false, Ordering::Release);
            action().await;
        });
        true
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn coalesces_calls_within_window() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn action_sees_latest_value_at_fire_time() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let value = Arc::new(Mutex::new("first"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (v, s) = (Arc::clone(&value), Arc::clone(&seen));
        assert!(debouncer.schedule(move || async move {
            let current = *v.lock().unwrap();
            s.lock().unwrap().push(current);
        }));

        tokio::time::sleep(Duration::from_millis(20)).await;
        *value.lock().unwrap() = "second";
        let (v, s) = (Arc::clone(&value), Arc::clone(&seen));
        assert!(!debouncer.schedule(move || async move {
            let current = *v.lock().unwrap();
            s.lock().unwrap().push(current);
        }));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rearms_after_firing() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let f = Arc::clone(&fired);
            assert!(debouncer.schedule(move || async move {
                f.fetch_add(1, Ordering::SeqCst);
            }));
            tokio::time::sleep(Duration::from_millis(150)).await;
        }

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
