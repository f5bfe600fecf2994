//! Scripted source client
//!
//! Returns the "steady" playback state unless a one-off result has been
//! queued for the next call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use vesta_sync::source::{SourceClient, SourceResult};
use vesta_sync::{SourceError, Song};

pub const GOOD_CODE: &str = "good-code";

#[derive(Default)]
pub struct FakeSource {
    current: Mutex<Option<Song>>,
    next: Mutex<Option<Song>>,
    scripted_current: Mutex<VecDeque<SourceResult<Option<Song>>>>,
    scripted_next: Mutex<VecDeque<SourceResult<Option<Song>>>>,
    authenticated: AtomicBool,
    current_calls: AtomicUsize,
    refreshes: AtomicUsize,
    queued: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_playing(&self, current: Option<Song>, next: Option<Song>) {
        *self.current.lock().unwrap() = current;
        *self.next.lock().unwrap() = next;
    }

    /// Answer for the next `current_track` call only.
    pub fn push_current(&self, result: SourceResult<Option<Song>>) {
        self.scripted_current.lock().unwrap().push_back(result);
    }

    pub fn push_next(&self, result: SourceResult<Option<Song>>) {
        self.scripted_next.lock().unwrap().push_back(result);
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> Vec<String> {
        self.queued.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceClient for FakeSource {
    fn authorize_url(&self) -> SourceResult<String> {
        Ok("https://accounts.example/authorize?client_id=test".to_string())
    }

    async fn authorize(&self, code: &str) -> SourceResult<()> {
        if code != GOOD_CODE {
            return Err(SourceError::Auth("invalid_grant".into()));
        }
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn current_track(&self) -> SourceResult<Option<Song>> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.scripted_current.lock().unwrap().pop_front() {
            return result;
        }
        match self.current.lock().unwrap().clone() {
            Some(song) => Ok(Some(song)),
            None => Err(SourceError::NotPlaying),
        }
    }

    async fn next_track(&self) -> SourceResult<Option<Song>> {
        if let Some(result) = self.scripted_next.lock().unwrap().pop_front() {
            return result;
        }
        Ok(self.next.lock().unwrap().clone())
    }

    async fn queue(&self) -> SourceResult<Vec<Song>> {
        Ok(self.next.lock().unwrap().clone().into_iter().collect())
    }

    async fn is_playing(&self) -> SourceResult<bool> {
        Ok(self.current.lock().unwrap().is_some())
    }

    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn connected_user_display_name(&self) -> SourceResult<String> {
        Ok("Test Listener".to_string())
    }

    async fn reset_authentication(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    async fn refresh_authentication(&self) -> SourceResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn add_to_queue(&self, query: &str) -> SourceResult<Song> {
        if query.is_empty() {
            return Err(SourceError::Transient("no track matches ''".into()));
        }
        self.queued.lock().unwrap().push(query.to_string());
        Ok(Song::new(query, "Requested Artist", ""))
    }
}
