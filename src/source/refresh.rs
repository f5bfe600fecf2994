//! Refreshes the source access token when the engine reports expiry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;

use super::SourceClient;
use crate::model::ObservableEvent;
use crate::sync::Subscriber;

pub struct TokenRefresher {
    source: Arc<dyn SourceClient>,
    runtime: Handle,
    in_flight: Arc<AtomicBool>,
}

impl TokenRefresher {
    /// Must be called from within a tokio runtime.
    pub fn new(source: Arc<dyn SourceClient>) -> Self {
        Self {
            source,
            runtime: Handle::current(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Subscriber for TokenRefresher {
    fn name(&self) -> &str {
        "token-refresher"
    }

    fn handle(&self, event: &ObservableEvent) -> anyhow::Result<()> {
        if !matches!(event, ObservableEvent::TokenExpired) {
            return Ok(());
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("Token refresh already running");
            return Ok(());
        }

        let source = Arc::clone(&self.source);
        let in_flight = Arc::clone(&self.in_flight);
        self.runtime.spawn(async move {
            match source.refresh_authentication().await {
                Ok(()) => tracing::info!("Access token refreshed"),
                Err(e) => tracing::error!(error = %e, "Could not refresh access token"),
            }
            in_flight.store(false, Ordering::Release);
        });
        Ok(())
    }
}
