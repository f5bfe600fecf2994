//! Events fanned out by the sync engine

use super::song::Song;

/// Event kinds, used for logging and for merging pending pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewSong,
    QueueUpdate,
    Logout,
    SourceError,
    TokenExpired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObservableEvent {
    /// The current song changed (or the state was observed for the first time).
    NewSong {
        current: Option<Song>,
        next: Option<Song>,
    },
    /// Only the up-next song changed.
    QueueUpdate {
        current: Option<Song>,
        next: Option<Song>,
    },
    Logout,
    /// The source stayed unavailable for a whole cycle.
    SourceError { message: String },
    TokenExpired,
}

impl ObservableEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ObservableEvent::NewSong { .. } => EventKind::NewSong,
            ObservableEvent::QueueUpdate { .. } => EventKind::QueueUpdate,
            ObservableEvent::Logout => EventKind::Logout,
            ObservableEvent::SourceError { .. } => EventKind::SourceError,
            ObservableEvent::TokenExpired => EventKind::TokenExpired,
        }
    }

    /// The `(current, next)` pair for song-carrying events.
    pub fn songs(&self) -> Option<(Option<&Song>, Option<&Song>)> {
        match self {
            ObservableEvent::NewSong { current, next }
            | ObservableEvent::QueueUpdate { current, next } => {
                Some((current.as_ref(), next.as_ref()))
            }
            _ => None,
        }
    }
}
