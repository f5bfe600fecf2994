//! vesta-sync: keeps a Vestaboard in step with Spotify playback
//!
//! The [`sync::SyncEngine`] polls a [`source::SourceClient`], caches what
//! it saw and publishes [`model::ObservableEvent`]s to attached
//! subscribers such as [`display::BoardSubscriber`].

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod model;
pub mod source;
pub mod sync;

pub use config::Config;
pub use error::{DisplayError, SourceError};
pub use model::{EventKind, ObservableEvent, PlaybackState, Song};
pub use sync::{EngineOptions, PollOutcome, PublishStrategy, SyncEngine};
