//! Runtime configuration
//!
//! Every option can come from the command line or the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::source::SpotifySourceConfig;
use crate::sync::{EngineOptions, PublishStrategy};

#[derive(Parser, Debug, Clone)]
#[command(name = "vesta-sync")]
#[command(about = "Mirrors what is playing on Spotify onto a Vestaboard")]
#[command(version)]
pub struct Config {
    /// Spotify application client id
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// OAuth redirect URL registered with the Spotify application
    #[arg(long, env = "REDIRECT_URL")]
    pub redirect_url: String,

    /// Vestaboard read/write API key
    #[arg(long, env = "VESTABOARD_KEY", hide_env_values = true)]
    pub vestaboard_key: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Quiet period before a detected change is pushed. 0 publishes directly.
    #[arg(long, env = "DEBOUNCE_MS", default_value_t = 100)]
    pub debounce_ms: u64,

    #[arg(long, env = "MAX_RATE_LIMIT_RETRIES", default_value_t = 3)]
    pub max_rate_limit_retries: u32,

    /// Upper bound on a single Retry-After wait
    #[arg(long, env = "MAX_BACKOFF_SECS", default_value_t = 60)]
    pub max_backoff_secs: u64,

    /// Front-end origin allowed by CORS
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    #[arg(long, env = "LOG_DIR", default_value = ".logs")]
    pub log_dir: PathBuf,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn engine_options(&self) -> EngineOptions {
        let publish = match self.debounce_ms {
            0 => PublishStrategy::Direct,
            ms => PublishStrategy::Debounced(Duration::from_millis(ms)),
        };
        EngineOptions {
            publish,
            max_rate_limit_retries: self.max_rate_limit_retries,
            max_backoff: Duration::from_secs(self.max_backoff_secs),
        }
    }

    pub fn spotify(&self) -> SpotifySourceConfig {
        SpotifySourceConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_url.clone(),
        }
    }
}
