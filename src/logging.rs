//! Logging setup for vesta-sync
//!
//! Sets up tracing with two outputs: a daily-rotating log file for later
//! inspection and stdout for whoever runs the service.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "vesta-sync";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/vesta-sync.YYYY-MM-DD.log` and mirrored
/// to stdout. The level can be controlled via `RUST_LOG`.
///
/// Default log levels:
/// - `vesta_sync` modules: DEBUG
/// - `rspotify`, `tower_http`: INFO
/// - Other crates: WARN
///
/// The returned guard flushes the file writer on drop, so keep it alive
/// for the lifetime of the process.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    // Ensure log directory exists
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // Daily rotating file, written through a non-blocking worker
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the defaults
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("vesta_sync=debug,rspotify=info,tower_http=info,warn")
    });

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true) // Include module path
        .with_span_events(FmtSpan::CLOSE); // Log when spans close

    // Operators watching the service get a compact view on stdout
    let stdout_layer = fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", log_dir.display());

    Ok(guard)
}

/// Log a source API request and its result
#[macro_export]
macro_rules! log_source_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "Source request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Source request failed"),
        }
    };
}

/// Log a source API request with additional context
#[macro_export]
macro_rules! log_source_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Source request started");
    };
}
