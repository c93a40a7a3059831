//! Foundation utilities for relkit
//!
//! - [`error::RelkitError`]: the aggregated library error, with
//!   [`error::FatalReport`] deciding how the entry point reports it
//! - [`exit_codes::ExitCode`]
//! - [`logging::init_tracing`]: diagnostics to stderr
//! - [`session::Session`]: console plus command runner, with the
//!   `required_*`, copy and `PATH` helpers attached
//! - OS helpers in [`paths`], [`files`] and [`glob`], conversions in
//!   [`convert`]

pub mod convert;
pub mod error;
pub mod exit_codes;
pub mod files;
pub mod glob;
pub mod logging;
pub mod paths;
pub mod required;
pub mod session;

pub use convert::{to_bool, to_int};
pub use error::{FailureClass, FatalReport, RelkitError, RequirementKind};
pub use exit_codes::ExitCode;
pub use files::{file_is_binary, file_is_binary_default};
pub use glob::{GlobOptions, GlobSort, glob_paths, os_glob};
pub use paths::{
    MacBundle, Platform, mac_bundle, os_binpath, os_home, os_parent, os_tempfile, script_path,
};
pub use session::Session;
