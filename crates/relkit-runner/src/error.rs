//! Error types for runner module

use relkit_sink::SinkError;
use thiserror::Error;

/// Errors raised while running an external command
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to launch '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Non-zero exit outside permissive mode. `message` is the full report.
    #[error("{message}")]
    CommandFailed {
        message: String,
        exit_code: i32,
        stdout: String,
    },

    #[error("Interrupted while running '{program}'")]
    Interrupted { program: String },

    #[error("Invalid PATH entry: {reason}")]
    InvalidPath { reason: String },
}

impl RunnerError {
    /// Exit code of the failed command, if the command ran.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
