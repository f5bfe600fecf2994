//! Spotify source client built on rspotify

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rspotify::{
    http::HttpError,
    model::{PlayableId, PlayableItem, SearchResult, SearchType},
    prelude::*,
    scopes, AuthCodeSpotify, ClientError, Config, Credentials, OAuth,
};

use super::{SourceClient, SourceResult};
use crate::error::SourceError;
use crate::model::Song;
use crate::{log_source_request, log_source_result};

/// Used when a 429 response carries no usable Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

const EXPIRED_TOKEN_MESSAGE: &str = "access token expired";

#[derive(Clone, Debug)]
pub struct SpotifySourceConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Spotify Web API client for the single connected account
#[derive(Clone)]
pub struct SpotifySource {
    client: Arc<AuthCodeSpotify>,
}

impl SpotifySource {
    pub fn new(config: &SpotifySourceConfig) -> Self {
        // App credentials plus the scopes the board and song requests need
        let credentials = Credentials::new(&config.client_id, &config.client_secret);
        let oauth = OAuth {
            redirect_uri: config.redirect_uri.clone(),
            scopes: scopes!(
                "user-modify-playback-state",
                "user-read-playback-state",
                "user-read-currently-playing",
                "user-read-email",
                "user-read-private"
            ),
            ..Default::default()
        };
        // Expiry is reported as TokenExpired and refreshed by a subscriber.
        let client = AuthCodeSpotify::with_config(
            credentials,
            oauth,
            Config {
                token_cached: false,
                token_refreshing: false,
                ..Default::default()
            },
        );

        tracing::debug!("rspotify client initialized");

        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl SourceClient for SpotifySource {
    fn authorize_url(&self) -> SourceResult<String> {
        self.client
            .get_authorize_url(true)
            .map_err(|e| SourceError::Auth(e.to_string()))
    }

    async fn authorize(&self, code: &str) -> SourceResult<()> {
        log_source_request!("request_token", code_len = code.len());
        let result = self.client.request_token(code).await;
        log_source_result!("request_token", result);
        result.map_err(|e| SourceError::Auth(e.to_string()))
    }

    async fn current_track(&self) -> SourceResult<Option<Song>> {
        tracing::trace!("Fetching current playback state");
        // Playback is None when no device is active
        let playback = self
            .client
            .current_playback(None, None::<Vec<_>>)
            .await
            .map_err(classify)?;

        now_playing(playback.and_then(|p| p.item).as_ref())
    }

    async fn next_track(&self) -> SourceResult<Option<Song>> {
        let queue = self.client.current_user_queue().await.map_err(classify)?;
        // The queue excludes the currently playing item
        Ok(queue.queue.first().and_then(song_from_item))
    }

    async fn queue(&self) -> SourceResult<Vec<Song>> {
        let queue = self.client.current_user_queue().await.map_err(classify)?;
        let songs: Vec<Song> = queue.queue.iter().filter_map(song_from_item).collect();
        tracing::debug!(count = songs.len(), "Fetched queue");
        Ok(songs)
    }

    async fn is_playing(&self) -> SourceResult<bool> {
        let playback = self
            .client
            .current_playback(None, None::<Vec<_>>)
            .await
            .map_err(classify)?;
        Ok(playback.map(|p| p.is_playing).unwrap_or(false))
    }

    async fn is_authenticated(&self) -> bool {
        match self.client.token.lock().await {
            Ok(token) => token.is_some(),
            Err(_) => false,
        }
    }

    async fn connected_user_display_name(&self) -> SourceResult<String> {
        let user = self.client.current_user().await.map_err(classify)?;
        Ok(user
            .display_name
            .unwrap_or_else(|| user.id.id().to_string()))
    }

    async fn reset_authentication(&self) {
        match self.client.token.lock().await {
            Ok(mut token) => *token = None,
            Err(_) => tracing::warn!("Could not lock token store to reset authentication"),
        }
        tracing::info!("Spotify authentication reset");
    }

    async fn refresh_authentication(&self) -> SourceResult<()> {
        log_source_request!("refresh_token", reason = "expired");
        let result = self.client.refresh_token().await;
        log_source_result!("refresh_token", result);
        result.map_err(|e| SourceError::Auth(e.to_string()))
    }

    async fn add_to_queue(&self, query: &str) -> SourceResult<Song> {
        tracing::info!(query, "Looking for track to add to queue");
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await
            .map_err(classify)?;

        let SearchResult::Tracks(page) = result else {
            return Err(SourceError::Transient("search returned no tracks".into()));
        };
        let Some(track) = page.items.into_iter().next() else {
            return Err(SourceError::Transient(format!("no track matches '{query}'")));
        };
        let Some(id) = track.id.clone() else {
            return Err(SourceError::Transient("matched track has no id".into()));
        };

        self.client
            .add_item_to_queue(PlayableId::Track(id), None)
            .await
            .map_err(classify)?;

        let song = song_from_item(&PlayableItem::Track(track))
            .ok_or_else(|| SourceError::Transient("matched track is not playable".into()))?;
        tracing::info!(title = %song.title, artist = %song.artist, "Added track to queue");
        Ok(song)
    }
}

/// No playback item at all means nothing is playing.
fn now_playing(item: Option<&PlayableItem>) -> SourceResult<Option<Song>> {
    match item {
        Some(item) => Ok(song_from_item(item)),
        None => Err(SourceError::NotPlaying),
    }
}

fn song_from_item(item: &PlayableItem) -> Option<Song> {
    match item {
        PlayableItem::Track(track) => {
            let artist = track
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default();
            let album_art = track
                .album
                .images
                .first()
                .map(|i| i.url.clone())
                .unwrap_or_default();
            Some(Song::new(track.name.clone(), artist, album_art))
        }
        PlayableItem::Episode(episode) => {
            let album_art = episode
                .images
                .first()
                .map(|i| i.url.clone())
                .unwrap_or_default();
            Some(Song::new(
                episode.name.clone(),
                episode.show.name.clone(),
                album_art,
            ))
        }
        PlayableItem::Unknown(_) => None,
    }
}

/// Maps an rspotify failure onto the closed [`SourceError`] set.
fn classify(error: ClientError) -> SourceError {
    match error {
        ClientError::Http(err) => match *err {
            HttpError::StatusCode(response) => {
                // Retry-After is only present on 429s
                let status = response.status().as_u16();
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                classify_status(status, retry_after.as_deref())
            }
            other => SourceError::Transient(other.to_string()),
        },
        // Token expiry can also surface as a plain error message
        other => {
            let message = other.to_string();
            if message.to_lowercase().contains(EXPIRED_TOKEN_MESSAGE) {
                SourceError::TokenExpired
            } else {
                SourceError::Transient(message)
            }
        }
    }
}

fn classify_status(status: u16, retry_after: Option<&str>) -> SourceError {
    match status {
        429 => SourceError::RateLimited {
            retry_after: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_RETRY_AFTER),
        },
        401 => SourceError::TokenExpired,
        403 => SourceError::Auth(format!("forbidden (status {status})")),
        _ => SourceError::Transient(format!("unexpected status {status}")),
    }
}
