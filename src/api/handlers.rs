//! HTTP request handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::server::AppContext;
use crate::error::SourceError;
use crate::model::Song;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AuthCodeQuery {
    code: String,
}

#[derive(Debug, Deserialize)]
pub struct SongRequest {
    query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResponse {
    is_connected: bool,
    connected_user: Option<String>,
    is_playing: bool,
    now_playing: Option<Song>,
    up_next: Option<Song>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    status: &'static str,
    data: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A source failure surfaced to the caller as 502.
#[derive(Debug)]
pub struct ApiError(SourceError);

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Source call failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Session
// ============================================================================

/// GET /get_auth_url
pub async fn get_auth_url(State(ctx): State<AppContext>) -> Result<String, ApiError> {
    Ok(ctx.engine.authorize_url()?)
}

/// GET /send_auth_token?code=...
pub async fn send_auth_token(
    State(ctx): State<AppContext>,
    Query(query): Query<AuthCodeQuery>,
) -> Json<bool> {
    Json(ctx.engine.login(&query.code).await)
}

/// GET /logout
pub async fn logout(State(ctx): State<AppContext>) -> StatusCode {
    ctx.engine.logout().await;
    StatusCode::OK
}

/// GET /auth_status
pub async fn auth_status(State(ctx): State<AppContext>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        status: "success",
        data: ctx.engine.auth_status().await,
    })
}

/// GET /connected_user
pub async fn connected_user(State(ctx): State<AppContext>) -> Json<Option<String>> {
    Json(ctx.engine.connected_user_name().await)
}

// ============================================================================
// Playback
// ============================================================================

/// GET /current
pub async fn current(State(ctx): State<AppContext>) -> Json<CurrentResponse> {
    let state = ctx.engine.get_state().await;
    Json(CurrentResponse {
        is_connected: state.is_connected,
        connected_user: state.connected_user_name,
        is_playing: state.is_playing,
        now_playing: state.current_song,
        up_next: state.next_song,
    })
}

/// GET /queue
pub async fn queue(State(ctx): State<AppContext>) -> Result<Json<Vec<Song>>, ApiError> {
    Ok(Json(ctx.engine.queue().await?))
}

/// POST /request_song
pub async fn request_song(
    State(ctx): State<AppContext>,
    Json(request): Json<SongRequest>,
) -> Result<Json<Song>, ApiError> {
    tracing::info!(query = %request.query, "Song requested");
    Ok(Json(ctx.engine.request_song(&request.query).await?))
}
