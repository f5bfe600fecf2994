//! Model module - value types shared by the engine and its collaborators
//!
//! - `song`: the `Song` value and featuring-credit trimming
//! - `state`: the cached `PlaybackState` and connection phase
//! - `events`: events published to subscribers

mod events;
mod song;
mod state;

pub use events::{EventKind, ObservableEvent};
pub use song::{trim_featuring, Song};
pub use state::{ConnectionPhase, PlaybackState};
