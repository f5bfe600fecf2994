//! Shared fixtures for vesta-sync integration tests
//!
//! - FakeSource: scripted in-memory `SourceClient`
//! - RecordingSubscriber: keeps every event it is handed

#![allow(dead_code)]

pub mod fake_source;
pub mod recording;

pub use fake_source::{FakeSource, GOOD_CODE};
pub use recording::RecordingSubscriber;

use vesta_sync::Song;

pub fn song(title: &str) -> Song {
    Song::new(title, format!("{title} Artist"), format!("https://img/{title}"))
}
