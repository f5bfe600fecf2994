//! Event bus subscriber that drives the board

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::client::Board;
use super::layout::now_playing_layout;
use crate::model::{ObservableEvent, Song};
use crate::sync::Subscriber;

const COMMAND_BUFFER: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardCommand {
    Show {
        current: Option<Song>,
        next: Option<Song>,
    },
    Clear,
}

impl BoardCommand {
    fn from_event(event: &ObservableEvent) -> Option<Self> {
        match event {
            ObservableEvent::NewSong { current, next }
            | ObservableEvent::QueueUpdate { current, next } => Some(BoardCommand::Show {
                current: current.clone(),
                next: next.clone(),
            }),
            ObservableEvent::Logout => Some(BoardCommand::Clear),
            ObservableEvent::SourceError { .. } | ObservableEvent::TokenExpired => None,
        }
    }
}

/// Turns song and logout events into board updates.
///
/// `handle` only enqueues; a single worker task owns the network calls so
/// the engine never waits on the board.
pub struct BoardSubscriber {
    commands: mpsc::Sender<BoardCommand>,
}

impl BoardSubscriber {
    /// Must be called from within a tokio runtime.
    pub fn spawn(board: Arc<dyn Board>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let worker = tokio::spawn(run_worker(board, rx));
        (Self { commands: tx }, worker)
    }
}

impl Subscriber for BoardSubscriber {
    fn name(&self) -> &str {
        "vestaboard"
    }

    fn handle(&self, event: &ObservableEvent) -> anyhow::Result<()> {
        let Some(command) = BoardCommand::from_event(event) else {
            return Ok(());
        };
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => anyhow::bail!("board worker is backed up, update dropped"),
            Err(TrySendError::Closed(_)) => anyhow::bail!("board worker has stopped"),
        }
    }
}

async fn run_worker(board: Arc<dyn Board>, mut commands: mpsc::Receiver<BoardCommand>) {
    while let Some(mut command) = commands.recv().await {
        // Only the newest state matters.
        while let Ok(newer) = commands.try_recv() {
            command = newer;
        }

        let result = match &command {
            BoardCommand::Show { current, next } => {
                board
                    .show(&now_playing_layout(current.as_ref(), next.as_ref()))
                    .await
            }
            BoardCommand::Clear => {
                tracing::info!("Logged out, clearing the board");
                board.clear().await
            }
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to update board");
        }
    }
    tracing::debug!("Board worker stopped");
}
