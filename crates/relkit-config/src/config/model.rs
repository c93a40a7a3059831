use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default number of process-output lines per batch callback invocation
pub const DEFAULT_BATCH_THRESHOLD: i64 = 10;

/// Default display width used by fill and header rendering
pub const DEFAULT_MAX_WIDTH: usize = 80;

/// Callback receiving a rendered message or a batch of output text.
pub type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from a configuration file.
    ConfigFile(Utf8PathBuf),
    /// Value set through [`SettingsBuilder`](super::SettingsBuilder).
    Programmatic,
    /// Built-in default.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::ConfigFile(path) => write!(f, "config ({path})"),
            Self::Programmatic => write!(f, "programmatic"),
            Self::Defaults => write!(f, "default"),
        }
    }
}

/// Session-wide configuration.
///
/// Read by the console (width, traceback flags, exit callback), by the trace
/// sink (threshold, log file, trace and batch callbacks) and by required
/// checks (`required_verbose`). Nothing writes to it after construction except
/// the entry point, which swaps `show_traceback` for
/// `show_traceback_entrypoint` before reporting an unexpected failure.
#[derive(Clone)]
pub struct Settings {
    /// Invoked with the rendered error block of every reported error
    pub exit_callback: Option<MessageCallback>,
    /// Receives each batch of captured process output
    pub trace_callback: Option<MessageCallback>,
    /// Receives each batch of captured process output, before `trace_callback`
    pub batch_callback: Option<MessageCallback>,
    /// Lines per batch; values below 1 behave as 1
    pub batch_threshold: i64,
    /// Existing file every captured process line is appended to
    pub process_log_file: Option<Utf8PathBuf>,
    pub show_traceback: bool,
    pub show_traceback_entrypoint: bool,
    /// Default verbosity of `required_*` checks
    pub required_verbose: bool,
    pub max_width: usize,
    /// Where each non-callback value came from
    pub source_attribution: BTreeMap<String, ConfigSource>,
}

impl Settings {
    /// Names of the values tracked in `source_attribution`
    pub const KEYS: [&'static str; 6] = [
        "batch_threshold",
        "process_log_file",
        "show_traceback",
        "show_traceback_entrypoint",
        "required_verbose",
        "max_width",
    ];

    /// Source of a tracked value, if known.
    #[must_use]
    pub fn source_of(&self, key: &str) -> Option<&ConfigSource> {
        self.source_attribution.get(key)
    }

    /// Whether any receiver is attached to captured process output batches.
    #[must_use]
    pub fn has_batch_receiver(&self) -> bool {
        self.batch_callback.is_some() || self.trace_callback.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        let source_attribution = Self::KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Defaults))
            .collect();

        Self {
            exit_callback: None,
            trace_callback: None,
            batch_callback: None,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            process_log_file: None,
            show_traceback: false,
            show_traceback_entrypoint: false,
            required_verbose: false,
            max_width: DEFAULT_MAX_WIDTH,
            source_attribution,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("exit_callback", &self.exit_callback.is_some())
            .field("trace_callback", &self.trace_callback.is_some())
            .field("batch_callback", &self.batch_callback.is_some())
            .field("batch_threshold", &self.batch_threshold)
            .field("process_log_file", &self.process_log_file)
            .field("show_traceback", &self.show_traceback)
            .field("show_traceback_entrypoint", &self.show_traceback_entrypoint)
            .field("required_verbose", &self.required_verbose)
            .field("max_width", &self.max_width)
            .finish_non_exhaustive()
    }
}

/// `relkit.toml` file structure. Every key is optional.
///
/// ```toml
/// batch_threshold = 25
/// process_log_file = "build/output.log"
/// show_traceback = false
/// show_traceback_entrypoint = true
/// required_verbose = true
/// max_width = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub batch_threshold: Option<i64>,
    pub process_log_file: Option<Utf8PathBuf>,
    pub show_traceback: Option<bool>,
    pub show_traceback_entrypoint: Option<bool>,
    pub required_verbose: Option<bool>,
    pub max_width: Option<usize>,
}

/// Values supplied on the command line. `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Explicit configuration file (skips discovery)
    pub config_path: Option<Utf8PathBuf>,
    pub batch_threshold: Option<i64>,
    pub process_log_file: Option<Utf8PathBuf>,
    pub show_traceback: Option<bool>,
    pub show_traceback_entrypoint: Option<bool>,
    pub required_verbose: Option<bool>,
    pub max_width: Option<usize>,
}
