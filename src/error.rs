//! Error handling
//!
//! The core operations (ingest, project, clear, snapshot) never fail.
//! Errors only exist at the edges: publishing into the channel, reading
//! replay files, and writing exports to disk.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Event channel adapter errors
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is closed, event '{0}' not delivered")]
    Closed(String),

    #[error("unknown subscription id {0}")]
    UnknownSubscription(u64),
}

/// Replay source errors
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
