//! Error types for the sink module

use camino::Utf8PathBuf;
use thiserror::Error;

/// Sink construction failed before any line was processed.
#[derive(Error, Debug)]
#[error("Sink log file not found: {path}")]
pub struct SinkInitError {
    /// The log file path that was requested but does not exist
    pub path: Utf8PathBuf,
}

/// Errors raised while a sink is forwarding lines
#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Init(#[from] SinkInitError),

    #[error("Failed to write line to console: {source}")]
    Console {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append line to {path}: {source}")]
    LogFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
