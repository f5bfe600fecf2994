use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use vesta_sync::api::{self, AppContext};
use vesta_sync::display::{BoardSubscriber, VestaboardClient};
use vesta_sync::logging;
use vesta_sync::source::{SourceClient, SpotifySource, TokenRefresher};
use vesta_sync::sync::spawn_poller;
use vesta_sync::{Config, SyncEngine};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== vesta-sync starting ===");

    let source: Arc<dyn SourceClient> = Arc::new(SpotifySource::new(&config.spotify()));
    let engine = SyncEngine::new(Arc::clone(&source), config.engine_options());

    let board = VestaboardClient::new(config.vestaboard_key.clone())
        .context("Failed to build Vestaboard client")?;
    let (board_subscriber, board_worker) = BoardSubscriber::spawn(Arc::new(board));
    engine.attach(Arc::new(board_subscriber));
    engine.attach(Arc::new(TokenRefresher::new(Arc::clone(&source))));

    let poller = spawn_poller(engine.clone(), config.poll_interval());

    let app = api::router(AppContext { engine }, &config.cors_origin)?;

    tokio::select! {
        result = api::run(config.bind_addr, app) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown requested"),
    }

    poller.abort();
    board_worker.abort();
    tracing::info!("=== vesta-sync stopped ===");
    Ok(())
}
