//! Vestaboard HTTP client
//!
//! Layouts are rendered by the public VBML compose endpoint and the
//! resulting grid is posted to the board's read/write API.

use std::time::Duration;

use async_trait::async_trait;

use super::layout::{blank_grid, CharacterGrid, Component, ComposeRequest};
use crate::error::DisplayError;

const COMPOSE_URL: &str = "https://vbml.vestaboard.com/compose";
const READ_WRITE_URL: &str = "https://rw.vestaboard.com/";
const READ_WRITE_KEY_HEADER: &str = "X-Vestaboard-Read-Write-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Something that can show a layout. Implemented by [`VestaboardClient`].
#[async_trait]
pub trait Board: Send + Sync {
    async fn show(&self, layout: &[Component]) -> Result<(), DisplayError>;

    async fn clear(&self) -> Result<(), DisplayError>;
}

pub struct VestaboardClient {
    http: reqwest::Client,
    read_write_key: String,
    compose_url: String,
    read_write_url: String,
}

impl VestaboardClient {
    pub fn new(read_write_key: impl Into<String>) -> Result<Self, DisplayError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vesta-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            read_write_key: read_write_key.into(),
            compose_url: COMPOSE_URL.to_string(),
            read_write_url: READ_WRITE_URL.to_string(),
        })
    }

    /// Renders `layout` into character codes.
    pub async fn compose(&self, layout: &[Component]) -> Result<CharacterGrid, DisplayError> {
        tracing::debug!(components = layout.len(), "Composing VBML layout");
        let response = self
            .http
            .post(&self.compose_url)
            .json(&ComposeRequest { components: layout })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DisplayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let grid: CharacterGrid = response
            .json()
            .await
            .map_err(|e| DisplayError::Compose(e.to_string()))?;
        if grid.is_empty() {
            return Err(DisplayError::Compose("empty character grid".into()));
        }
        Ok(grid)
    }

    pub async fn send_characters(&self, grid: &CharacterGrid) -> Result<(), DisplayError> {
        let response = self
            .http
            .post(&self.read_write_url)
            .header(READ_WRITE_KEY_HEADER, &self.read_write_key)
            .json(grid)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DisplayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(response = %body, "Board updated");
        Ok(())
    }
}

#[async_trait]
impl Board for VestaboardClient {
    async fn show(&self, layout: &[Component]) -> Result<(), DisplayError> {
        let grid = self.compose(layout).await?;
        self.send_characters(&grid).await
    }

    async fn clear(&self) -> Result<(), DisplayError> {
        self.send_characters(&blank_grid()).await
    }
}
