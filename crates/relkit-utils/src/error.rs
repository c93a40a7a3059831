use std::error::Error as StdError;
use std::fmt;
use std::io;

use relkit_config::ConfigError;
use relkit_console::FailureCause;
use relkit_runner::RunnerError;
use relkit_sink::{SinkError, SinkInitError};
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type.
///
/// Every relkit operation returns `RelkitError` (or one of the crate errors it
/// wraps). Nothing in the library exits the process: the entry point turns an
/// unrecovered error into a [`FatalReport`] and the process exit status.
///
/// # Example
///
/// ```rust
/// use relkit_utils::error::{RelkitError, RequirementKind};
/// use relkit_utils::exit_codes::ExitCode;
///
/// let err = RelkitError::RequirementMissing {
///     kind: RequirementKind::Command,
///     item: "7z".to_string(),
///     info: "Install p7zip".to_string(),
/// };
/// assert_eq!(err.to_string(), "Command '7z' is required. Install p7zip");
/// assert_eq!(err.to_exit_code(), ExitCode::FAILURE);
/// ```
#[derive(Error, Debug)]
pub enum RelkitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SinkInit(#[from] SinkInitError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{kind} '{item}' is required.{}", with_space(.info))]
    RequirementMissing {
        kind: RequirementKind,
        item: String,
        info: String,
    },

    #[error("Glob '{pattern}' has failed.{}", with_space(.info))]
    GlobNoMatch { pattern: String, info: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("Failed to create temp file: {source}")]
    TempFile {
        #[source]
        source: io::Error,
    },

    #[error("Missing key '{key}' during AWS Auth")]
    AwsMissingKey { key: String },

    #[error("Invalid AWS credential output: {reason}")]
    AwsInvalidCredentials { reason: String },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    #[error("User interrupts execution.")]
    Interrupted,

    #[error("panic: {message}")]
    Panic { message: String },
}

fn with_space(info: &str) -> String {
    if info.is_empty() {
        String::new()
    } else {
        format!(" {info}")
    }
}

/// What a `required_*` check was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Command,
    File,
    Folder,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Command => "Command",
            Self::File => "File",
            Self::Folder => "Folder",
        })
    }
}

impl RelkitError {
    /// Short category name, used as the cause kind in error blocks.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::SinkInit(_) | Self::Sink(_) => "Sink",
            Self::Runner(_) => "Runner",
            Self::Io(_) => "Io",
            Self::RequirementMissing { .. } => "Requirement",
            Self::GlobNoMatch { .. } | Self::InvalidGlob { .. } => "Glob",
            Self::TempFile { .. } => "TempFile",
            Self::AwsMissingKey { .. } | Self::AwsInvalidCredentials { .. } => "Aws",
            Self::NonUtf8Path { .. } => "Path",
            Self::Interrupted => "Interrupted",
            Self::Panic { .. } => "Panic",
        }
    }

    /// Suggested actions shown by [`display_for_user`](Self::display_for_user).
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) => vec![
                "Check relkit.toml, or the file named by --config or RELKIT_CONFIG".to_string(),
                "Remove keys relkit does not know about".to_string(),
            ],
            Self::SinkInit(_) => {
                vec!["Create the process log file before starting relkit".to_string()]
            }
            Self::Runner(RunnerError::SpawnFailed { .. }) => {
                vec!["Check that the program is installed and on PATH".to_string()]
            }
            _ => Vec::new(),
        }
    }

    /// Message for errors reported before a console exists (plain stderr).
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {self}\n");

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Exit code for this error.
    ///
    /// Configuration problems map to [`ExitCode::CLI_ARGS`]; every other fatal
    /// error exits with [`ExitCode::FAILURE`].
    #[must_use]
    pub const fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            _ => ExitCode::FAILURE,
        }
    }

    /// Classification when this error is looked at on its own, without its
    /// sources.
    const fn direct_class(&self) -> Option<FailureClass> {
        match self {
            Self::Interrupted | Self::Runner(RunnerError::Interrupted { .. }) => {
                Some(FailureClass::Interrupted)
            }
            Self::Runner(RunnerError::CommandFailed { .. })
            | Self::RequirementMissing { .. }
            | Self::GlobNoMatch { .. }
            | Self::AwsMissingKey { .. } => Some(FailureClass::Reported),
            _ => None,
        }
    }
}

// ============================================================================
// Fatal reporting
// ============================================================================

/// How the entry point reports an unrecovered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// A library prerequisite or command failure with its own message
    Reported,
    /// Operator interrupt
    Interrupted,
    /// A file could not be accessed
    PermissionDenied,
    /// Anything else, panics included
    Unexpected,
}

impl FailureClass {
    /// Whether the entry point swaps in `show_traceback_entrypoint` before
    /// reporting.
    #[must_use]
    pub const fn uses_entrypoint_traceback(self) -> bool {
        !matches!(self, Self::Reported)
    }
}

/// Message and cause for the fatal error block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalReport {
    pub class: FailureClass,
    pub message: String,
    pub cause: Option<FailureCause>,
}

impl FatalReport {
    /// Classify `error` by walking its source chain.
    #[must_use]
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut current = Some(error);
        while let Some(err) = current {
            if let Some(relkit) = err.downcast_ref::<RelkitError>()
                && let Some(class) = relkit.direct_class()
            {
                return Self::build(class, err, relkit.kind_name());
            }
            if let Some(runner) = err.downcast_ref::<RunnerError>() {
                match runner {
                    RunnerError::Interrupted { .. } => {
                        return Self::build(FailureClass::Interrupted, err, "Runner");
                    }
                    RunnerError::CommandFailed { .. } => {
                        return Self::build(FailureClass::Reported, err, "Runner");
                    }
                    _ => {}
                }
            }
            if let Some(io_err) = err.downcast_ref::<io::Error>()
                && io_err.kind() == io::ErrorKind::PermissionDenied
            {
                return Self::build(FailureClass::PermissionDenied, error, kind_of(error));
            }
            current = err.source();
        }

        Self::build(FailureClass::Unexpected, error, kind_of(error))
    }

    /// Report for a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self {
            class: FailureClass::Unexpected,
            message: "Unexpected".to_string(),
            cause: Some(FailureCause::new("Panic", message)),
        }
    }

    fn build(class: FailureClass, error: &(dyn StdError + 'static), kind: &str) -> Self {
        match class {
            FailureClass::Reported => Self {
                class,
                message: error.to_string(),
                cause: None,
            },
            FailureClass::Interrupted => Self {
                class,
                message: "User interrupts execution.".to_string(),
                cause: None,
            },
            FailureClass::PermissionDenied => Self {
                class,
                message: "Some files are in use, execution blocked".to_string(),
                cause: Some(FailureCause::from_error(kind, error)),
            },
            FailureClass::Unexpected => Self {
                class,
                message: "Unexpected".to_string(),
                cause: Some(FailureCause::from_error(kind, error)),
            },
        }
    }
}

fn kind_of(error: &(dyn StdError + 'static)) -> &'static str {
    if let Some(relkit) = error.downcast_ref::<RelkitError>() {
        relkit.kind_name()
    } else if error.is::<RunnerError>() {
        "Runner"
    } else if error.is::<io::Error>() {
        "Io"
    } else {
        "Error"
    }
}
