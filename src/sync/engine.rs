//! State synchronization engine
//!
//! Owns the cached [`PlaybackState`], reconciles it against the source on
//! every poll and publishes an event whenever the current or next song
//! changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use super::backoff::{RateLimitBackoff, DEFAULT_MAX_RETRIES, DEFAULT_MAX_WAIT};
use super::bus::{EventBus, Subscriber, SubscriberId};
use super::debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
use crate::error::SourceError;
use crate::model::{ConnectionPhase, EventKind, ObservableEvent, PlaybackState, Song};
use crate::source::{SourceClient, SourceResult};

/// How a detected change reaches subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishStrategy {
    /// Publish on the polling task as soon as the change is detected.
    Direct,
    /// Coalesce changes and publish once after the quiet period.
    Debounced(Duration),
}

#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub publish: PublishStrategy,
    pub max_rate_limit_retries: u32,
    pub max_backoff: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            publish: PublishStrategy::Debounced(DEFAULT_QUIET_PERIOD),
            max_rate_limit_retries: DEFAULT_MAX_RETRIES,
            max_backoff: DEFAULT_MAX_WAIT,
        }
    }
}

/// What a single `poll()` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Disconnected,
    /// Another cycle (poll or login) was still running.
    Busy,
    /// Neither song could be fetched; the cache was left alone.
    Unobserved,
    Unchanged,
    Changed(EventKind),
}

struct Cache {
    playback: PlaybackState,
    phase: ConnectionPhase,
    /// Kind of the push waiting on the debounce timer.
    pending: Option<EventKind>,
}

struct Inner {
    source: Arc<dyn SourceClient>,
    bus: EventBus,
    cache: RwLock<Cache>,
    /// Held for the whole of a poll or login so cycles never overlap.
    cycle: Mutex<()>,
    debouncer: Option<Debouncer>,
    backoff: RateLimitBackoff,
}

/// Problems seen during one cycle that subscribers should hear about.
#[derive(Default)]
struct CycleIssues {
    token_expired: bool,
    unavailable: Option<String>,
}

impl CycleIssues {
    fn note(&mut self, error: &SourceError) {
        match error {
            SourceError::TokenExpired => self.token_expired = true,
            SourceError::Unavailable { .. } => {
                self.unavailable.get_or_insert_with(|| error.to_string());
            }
            _ => {}
        }
    }
}

#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

impl SyncEngine {
    pub fn new(source: Arc<dyn SourceClient>, options: EngineOptions) -> Self {
        let debouncer = match options.publish {
            PublishStrategy::Direct => None,
            PublishStrategy::Debounced(quiet) => Some(Debouncer::new(quiet)),
        };
        tracing::debug!(publish = ?options.publish, "SyncEngine created");

        Self {
            inner: Arc::new(Inner {
                source,
                bus: EventBus::new(),
                cache: RwLock::new(Cache {
                    playback: PlaybackState::default(),
                    phase: ConnectionPhase::Disconnected,
                    pending: None,
                }),
                cycle: Mutex::new(()),
                debouncer,
                backoff: RateLimitBackoff::new(options.max_rate_limit_retries, options.max_backoff),
            }),
        }
    }

    pub fn attach(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        self.inner.bus.attach(subscriber)
    }

    pub fn detach(&self, id: SubscriberId) -> bool {
        self.inner.bus.detach(id)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Exchanges `code` for credentials, refreshes the cache and announces
    /// the freshly observed songs. Failures are logged, never raised.
    pub async fn login(&self, code: &str) -> bool {
        let _cycle = self.inner.cycle.lock().await;

        if let Err(e) = self.inner.source.authorize(code).await {
            tracing::warn!(error = %e, "Error submitting auth code");
            return false;
        }

        {
            let mut cache = self.inner.cache.write().await;
            cache.playback.reset();
            cache.playback.is_connected = true;
            cache.phase = ConnectionPhase::Uninitialized;
            cache.pending = None;
        }

        if !self.refresh_cache().await {
            tracing::info!("Logged out before login finished");
            return false;
        }

        let user = self.connected_user_name().await;
        tracing::info!(user = user.as_deref().unwrap_or("<unknown>"), "Auth code accepted, logged in");

        self.announce(EventKind::NewSong).await;
        // A logout may have landed after the refresh.
        self.is_connected().await
    }

    /// Drops credentials and tells subscribers to blank the display.
    pub async fn logout(&self) {
        tracing::info!("Logging out, resetting source authentication");
        self.inner.source.reset_authentication().await;

        {
            let mut cache = self.inner.cache.write().await;
            cache.playback.reset();
            cache.phase = ConnectionPhase::Disconnected;
            cache.pending = None;
        }

        self.inner.bus.publish(&ObservableEvent::Logout);
    }

    // ========================================================================
    // Poll cycle
    // ========================================================================

    /// One reconciliation pass against the source. Never fails; every
    /// source error is logged and treated as "could not observe".
    pub async fn poll(&self) -> PollOutcome {
        if !self.is_connected().await {
            return PollOutcome::Disconnected;
        }
        let Ok(_cycle) = self.inner.cycle.try_lock() else {
            tracing::debug!("Previous cycle still running, skipping poll");
            return PollOutcome::Busy;
        };

        let mut issues = CycleIssues::default();
        let source = &self.inner.source;
        let backoff = &self.inner.backoff;

        let (current, next, playing) = futures::join!(
            backoff.run("current_track", || source.current_track()),
            backoff.run("next_track", || source.next_track()),
            backoff.run("is_playing", || source.is_playing()),
        );
        let observed_current = observe("current_track", current, &mut issues);
        let observed_next = observe("next_track", next, &mut issues);
        if let Err(e) = &playing {
            issues.note(e);
        }

        let outcome = {
            let mut cache = self.inner.cache.write().await;
            if cache.phase == ConnectionPhase::Disconnected {
                // Logged out while the fetches were in flight.
                return PollOutcome::Disconnected;
            }
            if let Ok(is_playing) = playing {
                cache.playback.is_playing = is_playing;
            }
            reconcile(&mut cache, observed_current, observed_next)
        };

        match outcome {
            PollOutcome::Changed(kind) => {
                let state = self.get_state().await;
                tracing::info!(
                    kind = ?kind,
                    now_playing = state.current_song.as_ref().map(|s| s.title.as_str()).unwrap_or("<nothing>"),
                    up_next = state.next_song.as_ref().map(|s| s.title.as_str()).unwrap_or("<nothing>"),
                    "Playback changed"
                );
                self.announce(kind).await;
            }
            PollOutcome::Unobserved => tracing::debug!("Could not observe playback this cycle"),
            _ => tracing::trace!("Playback unchanged"),
        }

        self.report(issues);
        outcome
    }

    /// Re-reads user name, playing flag and both songs without publishing.
    /// Caller holds the cycle lock. Returns false, leaving the cache alone,
    /// when a logout landed while the fetches were in flight.
    async fn refresh_cache(&self) -> bool {
        let mut issues = CycleIssues::default();
        let source = &self.inner.source;
        let backoff = &self.inner.backoff;

        let user = backoff
            .run("connected_user", || source.connected_user_display_name())
            .await;
        let playing = backoff.run("is_playing", || source.is_playing()).await;
        let current = observe(
            "current_track",
            backoff.run("current_track", || source.current_track()).await,
            &mut issues,
        );
        let next = observe(
            "next_track",
            backoff.run("next_track", || source.next_track()).await,
            &mut issues,
        );

        {
            let mut cache = self.inner.cache.write().await;
            if cache.phase == ConnectionPhase::Disconnected {
                return false;
            }
            match user {
                Ok(name) => cache.playback.connected_user_name = Some(name),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not get connected user");
                    issues.note(&e);
                }
            }
            match playing {
                Ok(is_playing) => cache.playback.is_playing = is_playing,
                Err(e) => issues.note(&e),
            }
            if let Some(song) = current {
                cache.playback.current_song = song;
            }
            if let Some(song) = next {
                cache.playback.next_song = song;
            }
        }

        tracing::debug!("Cache refreshed");
        self.report(issues);
        true
    }

    // ========================================================================
    // Publishing
    // ========================================================================

    async fn announce(&self, kind: EventKind) {
        let Some(debouncer) = &self.inner.debouncer else {
            if let Some(event) = self.song_event(kind).await {
                self.inner.bus.publish(&event);
            }
            return;
        };

        {
            let mut cache = self.inner.cache.write().await;
            cache.pending = Some(match cache.pending {
                Some(EventKind::NewSong) => EventKind::NewSong,
                _ => kind,
            });
        }

        let engine = self.clone();
        debouncer.schedule(move || async move {
            engine.flush_pending().await;
        });
    }

    /// Fired by the debounce timer: publishes the latest cached songs.
    async fn flush_pending(&self) {
        let event = {
            let mut cache = self.inner.cache.write().await;
            let Some(kind) = cache.pending.take() else {
                return;
            };
            if cache.phase == ConnectionPhase::Disconnected {
                return;
            }
            song_event_from(kind, &cache.playback)
        };
        self.inner.bus.publish(&event);
    }

    async fn song_event(&self, kind: EventKind) -> Option<ObservableEvent> {
        let cache = self.inner.cache.read().await;
        if cache.phase == ConnectionPhase::Disconnected {
            return None;
        }
        Some(song_event_from(kind, &cache.playback))
    }

    fn report(&self, issues: CycleIssues) {
        if issues.token_expired {
            tracing::warn!("Source access token expired");
            self.inner.bus.publish(&ObservableEvent::TokenExpired);
        }
        if let Some(message) = issues.unavailable {
            self.inner
                .bus
                .publish(&ObservableEvent::SourceError { message });
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Consistent copy of the cached state. Never waits on a backoff.
    pub async fn get_state(&self) -> PlaybackState {
        self.inner.cache.read().await.playback.clone()
    }

    pub async fn phase(&self) -> ConnectionPhase {
        self.inner.cache.read().await.phase
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.cache.read().await.playback.is_connected
    }

    pub async fn connected_user_name(&self) -> Option<String> {
        self.inner
            .cache
            .read()
            .await
            .playback
            .connected_user_name
            .clone()
    }

    /// Whether the source currently holds credentials.
    pub async fn auth_status(&self) -> bool {
        self.inner.source.is_authenticated().await
    }

    pub fn authorize_url(&self) -> SourceResult<String> {
        self.inner.source.authorize_url()
    }

    pub async fn queue(&self) -> SourceResult<Vec<Song>> {
        let source = &self.inner.source;
        self.inner.backoff.run("queue", || source.queue()).await
    }

    /// Queues the first track matching `query`. The change shows up on the
    /// board with the next poll.
    pub async fn request_song(&self, query: &str) -> SourceResult<Song> {
        self.inner.source.add_to_queue(query).await
    }
}

/// `Some(song_or_none)` when the fetch produced an answer, `None` when
/// the cycle could not tell.
fn observe(
    operation: &str,
    result: SourceResult<Option<Song>>,
    issues: &mut CycleIssues,
) -> Option<Option<Song>> {
    match result {
        Ok(song) => Some(song),
        Err(SourceError::NotPlaying) => {
            tracing::debug!(operation, "Not playing anything");
            Some(None)
        }
        Err(e) => {
            tracing::warn!(operation, error = %e, "Could not fetch from source");
            issues.note(&e);
            None
        }
    }
}

fn reconcile(
    cache: &mut Cache,
    observed_current: Option<Option<Song>>,
    observed_next: Option<Option<Song>>,
) -> PollOutcome {
    if observed_current.is_none() && observed_next.is_none() {
        return PollOutcome::Unobserved;
    }

    let first = cache.phase == ConnectionPhase::Uninitialized;
    let current_changed = observed_current
        .as_ref()
        .is_some_and(|song| *song != cache.playback.current_song);
    let next_changed = observed_next
        .as_ref()
        .is_some_and(|song| *song != cache.playback.next_song);

    if let Some(song) = observed_current {
        cache.playback.current_song = song;
    }
    if let Some(song) = observed_next {
        cache.playback.next_song = song;
    }
    cache.phase = ConnectionPhase::Synced;

    if first || current_changed {
        PollOutcome::Changed(EventKind::NewSong)
    } else if next_changed {
        PollOutcome::Changed(EventKind::QueueUpdate)
    } else {
        PollOutcome::Unchanged
    }
}

fn song_event_from(kind: EventKind, playback: &PlaybackState) -> ObservableEvent {
    let current = playback.current_song.clone();
    let next = playback.next_song.clone();
    match kind {
        EventKind::QueueUpdate => ObservableEvent::QueueUpdate { current, next },
        _ => ObservableEvent::NewSong { current, next },
    }
}
