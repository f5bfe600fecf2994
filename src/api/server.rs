//! HTTP server setup and routing

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::sync::SyncEngine;

use super::handlers;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppContext {
    pub engine: SyncEngine,
}

/// Builds the router. `cors_origin` is the only origin allowed to call
/// the API from a browser.
pub fn router(ctx: AppContext, cors_origin: &str) -> anyhow::Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin '{cors_origin}'"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        // Session
        .route("/get_auth_url", get(handlers::get_auth_url))
        .route("/send_auth_token", get(handlers::send_auth_token))
        .route("/logout", get(handlers::logout))
        .route("/auth_status", get(handlers::auth_status))
        .route("/connected_user", get(handlers::connected_user))
        // Playback
        .route("/current", get(handlers::current))
        .route("/queue", get(handlers::queue))
        .route("/request_song", post(handlers::request_song))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

pub async fn run(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}
