//! Subscriber that remembers what it was sent

use std::sync::Mutex;

use vesta_sync::sync::Subscriber;
use vesta_sync::{EventKind, ObservableEvent};

#[derive(Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<ObservableEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservableEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Subscriber for RecordingSubscriber {
    fn name(&self) -> &str {
        "recording"
    }

    fn handle(&self, event: &ObservableEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
