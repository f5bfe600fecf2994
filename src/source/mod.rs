//! Playback source collaborator
//!
//! The engine talks to the streaming service only through [`SourceClient`].
//! `spotify` holds the rspotify-backed implementation and `refresh` the
//! subscriber that renews its token.

mod refresh;
mod spotify;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::Song;

pub use refresh::TokenRefresher;
pub use spotify::{SpotifySource, SpotifySourceConfig};

pub type SourceResult<T> = Result<T, SourceError>;

/// Narrow interface to the streaming service for a single connected account.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// URL of the "allow this app" consent page.
    fn authorize_url(&self) -> SourceResult<String>;

    /// Exchanges a one-time authorization code for credentials.
    async fn authorize(&self, code: &str) -> SourceResult<()>;

    async fn current_track(&self) -> SourceResult<Option<Song>>;

    /// First song in the play queue.
    async fn next_track(&self) -> SourceResult<Option<Song>>;

    async fn queue(&self) -> SourceResult<Vec<Song>>;

    async fn is_playing(&self) -> SourceResult<bool>;

    async fn is_authenticated(&self) -> bool;

    async fn connected_user_display_name(&self) -> SourceResult<String>;

    /// Drops the stored credentials.
    async fn reset_authentication(&self);

    /// Trades the refresh token for a new access token.
    async fn refresh_authentication(&self) -> SourceResult<()>;

    /// Searches for `query` and queues the first matching track.
    async fn add_to_queue(&self, query: &str) -> SourceResult<Song>;
}
