//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use relkit_config::SettingsOverrides;
use relkit_console::BoxStyle;
use relkit_utils::GlobSort;

/// relkit - build and release scripting helpers
#[derive(Parser)]
#[command(name = "relkit")]
#[command(about = "Run build commands with teed output and consistent failure reporting")]
#[command(long_about = r#"
relkit runs the external commands of a build script, streams their output to the
console, an optional log file and batch receivers, and turns failures into one
consistent error block and exit status.

EXAMPLES:
  # Run a command, streaming its output
  relkit run -- cmake --build build --config Release

  # Keep going when tests fail, logging their output to a file
  relkit --log-file build/test.log run --permissive --context "Tests failed" -- ctest

  # Newest Qt version directory
  relkit glob 'C:/Qt/*.*.*' --sort version

  # Ask which configuration to build
  relkit menu Debug Release RelWithDebInfo

  # Fail early when a tool is missing
  relkit require command 7z --info "Install p7zip"

CONFIGURATION:
  Settings are loaded with precedence: CLI flags > config file > defaults
  The config file is --config, else $RELKIT_CONFIG, else ./relkit.toml
  Diagnostics go to stderr, filtered by $RELKIT_LOG
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Existing file every captured output line is appended to
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Captured lines per batch (default: 10, values below 1 mean 1)
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub batch_threshold: Option<i64>,

    /// Append a backtrace to error blocks
    #[arg(long, global = true)]
    pub show_traceback: bool,

    /// Display width for headers and fill lines (default: 80)
    #[arg(long, global = true)]
    pub width: Option<usize>,

    /// Log found items in `require` checks
    #[arg(long, global = true)]
    pub required_verbose: bool,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings overrides carried by the global flags.
    #[must_use]
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_path: self
                .config
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned().into()),
            batch_threshold: self.batch_threshold,
            process_log_file: self
                .log_file
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned().into()),
            show_traceback: self.show_traceback.then_some(true),
            show_traceback_entrypoint: self.show_traceback.then_some(true),
            required_verbose: self.required_verbose.then_some(true),
            max_width: self.width,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a command, streaming its output through relkit
    ///
    /// A non-zero exit code is fatal unless --permissive is given.
    ///
    /// EXAMPLES:
    ///   relkit run -- make -j8
    ///   relkit run --shell -- "ls build | wc -l"
    ///   relkit run --verbosity 1 --cwd build -- ninja
    Run(RunArgs),

    /// Pick one of the given options interactively and print it
    ///
    /// Uses fzf when it is on PATH, otherwise a numbered menu.
    /// Exits with 1 when nothing is picked.
    Menu {
        /// Options to choose from
        #[arg(required = true)]
        options: Vec<String>,

        /// Menu title
        #[arg(long, default_value = "Choose one")]
        header: String,

        /// Input prompt
        #[arg(long, default_value = "Option:")]
        prompt: String,

        /// Number of the first option
        #[arg(long, default_value_t = 1)]
        starts_at: usize,
    },

    /// Fail unless a command, file or folder exists
    Require {
        kind: RequireKind,

        /// Command name or path
        item: String,

        /// Extra hint appended to the failure message
        #[arg(long, default_value = "")]
        info: String,
    },

    /// Print the first path matching a glob pattern
    Glob {
        pattern: String,

        /// Ordering applied before the first match is picked
        #[arg(long, value_enum, default_value_t = SortArg::Alpha)]
        sort: SortArg,

        /// Reverse the ordering
        #[arg(long)]
        reverse: bool,

        /// Extra hint appended to the failure message
        #[arg(long, default_value = "")]
        info: String,
    },

    /// Print a boxed header
    Header {
        title: String,

        #[arg(long, value_enum, default_value_t = StyleArg::Bold)]
        style: StyleArg,

        /// Open the bottom-left corner for a list below
        #[arg(long)]
        tree: bool,
    },

    /// Add a file or directory to a zip archive with 7z
    Zip {
        /// Archive to create or update
        dst: String,
        /// File or directory to add
        src: String,
    },

    /// AWS helpers
    #[command(subcommand)]
    Aws(AwsCommands),

    /// Print the Qt SDK layout of this host
    QtInfo,

    /// Print the effective settings and where each value came from
    Config,
}

/// Options of `relkit run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command and arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,

    /// 0: silent, 1: echo the command, 2: echo and stream output
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub verbosity: i64,

    /// Return the exit code instead of failing on a non-zero exit
    #[arg(long)]
    pub permissive: bool,

    /// Prefix of the failure message
    #[arg(long, default_value = "")]
    pub context: String,

    /// Working directory of the command
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Join the arguments and run them through the platform shell
    #[arg(long)]
    pub shell: bool,

    /// Keep stderr out of the captured output
    #[arg(long)]
    pub no_merge: bool,

    /// Ask the command for line-buffered output where supported
    #[arg(long)]
    pub line_buffered: bool,
}

/// AWS subcommands
#[derive(Subcommand)]
pub enum AwsCommands {
    /// Upload a file to S3 with caching disabled. Failures are not fatal.
    Copy {
        file: String,
        s3_path: String,
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Obtain temporary credentials and run a command with them
    ///
    /// EXAMPLES:
    ///   relkit aws auth --certificate cert.pem --private-key key.pem \
    ///     --trust-anchor-arn ... --profile-arn ... --role-arn ... -- aws s3 ls
    Auth {
        #[arg(long)]
        certificate: String,
        #[arg(long)]
        private_key: String,
        #[arg(long)]
        trust_anchor_arn: String,
        #[arg(long)]
        profile_arn: String,
        #[arg(long)]
        role_arn: String,
        /// Hint appended to the missing certificate and key messages
        #[arg(long, default_value = "")]
        info: String,
        /// Command to run with the credentials in its environment
        #[arg(last = true)]
        command: Vec<String>,
    },
}

/// What `relkit require` looks for
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequireKind {
    Command,
    File,
    Folder,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    None,
    Alpha,
    Version,
}

impl From<SortArg> for GlobSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::None => Self::None,
            SortArg::Alpha => Self::Alpha,
            SortArg::Version => Self::VersionNumber,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Light,
    Bold,
    Double,
    Rounded,
    Ascii,
}

impl From<StyleArg> for BoxStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Light => Self::Light,
            StyleArg::Bold => Self::Bold,
            StyleArg::Double => Self::Double,
            StyleArg::Rounded => Self::Rounded,
            StyleArg::Ascii => Self::Ascii,
        }
    }
}

/// Build the CLI command structure without parsing arguments
/// This is used for introspection in tests and documentation validation
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
