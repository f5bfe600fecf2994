//! Cached playback state owned by the sync engine

use serde::Serialize;

use super::song::Song;

/// What the engine last observed from the source.
///
/// `current_song` and `next_song` both `None` right after login means
/// "not yet observed". After the first successful poll it means the
/// source reported nothing playing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_song: Option<Song>,
    pub next_song: Option<Song>,
    pub is_playing: bool,
    pub is_connected: bool,
    pub connected_user_name: Option<String>,
}

impl PlaybackState {
    /// Drops everything learned from the source session.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Engine-level connection lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    /// Logged in, first poll has not completed yet.
    Uninitialized,
    Synced,
}
