//! relkit - build and release scripting toolkit
//!
//! relkit runs the external commands of a build script, tees their output to
//! the console, a log file and batch callbacks, and turns failures into a
//! consistent error report and exit status.
//!
//! relkit can be used in two ways:
//! - **CLI**: the `relkit` binary exposes the helpers as subcommands
//! - **Library**: write the build script in Rust around [`entrypoint`]
//!
//! # Quick Start (Library)
//!
//! ```no_run
//! use relkit::{CommandSpec, GlobOptions, RunOptions, Settings, entrypoint, os_glob, zip_it};
//!
//! fn main() {
//!     let settings = Settings::builder().batch_threshold(25).build().expect("valid settings");
//!     let code = entrypoint(settings, |session| {
//!         session.required_command("cmake", "Install CMake")?;
//!         session.run(
//!             &CommandSpec::new("cmake").args(["--build", "build", "--config", "Release"]),
//!             &RunOptions::new().error_context("Build failed"),
//!         )?;
//!         let app = os_glob("build/Release/*.exe", &GlobOptions::default())?;
//!         zip_it(session, "dist/app.zip", &app)?;
//!         Ok(())
//!     });
//!     std::process::exit(code.as_i32());
//! }
//! ```
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! relkit run -- cmake --build build
//! relkit --batch-threshold 1 --log-file build.log run --permissive -- ctest
//! relkit glob 'C:/Qt/*.*.*' --sort version
//! relkit menu Debug Release
//! ```
//!
//! # Crates
//!
//! | crate | provides |
//! |---|---|
//! | `relkit-sink` | [`LineSink`] |
//! | `relkit-config` | [`Settings`] and `relkit.toml` discovery |
//! | `relkit-console` | [`Console`] with headers and error blocks |
//! | `relkit-runner` | [`CommandRunner`], [`CommandSpec`], [`RunOptions`] |
//! | `relkit-utils` | [`Session`], [`RelkitError`], required checks, OS helpers |
//! | `relkit-prompt` | [`menu`] |
//! | `relkit-integrations` | AWS, Qt and 7z helpers |

pub mod cli;
pub mod entrypoint;

pub use entrypoint::{entrypoint, run_in_session};

pub use relkit_config::{ConfigError, ConfigSource, Settings, SettingsBuilder, SettingsOverrides};
pub use relkit_console::{BoxStyle, BoxTheme, Console, FailureCause, HeaderOptions};
pub use relkit_integrations::{
    AwsAuthRequest, AwsCredentials, QtInfo, aws_auth, aws_copy_file, zip_it,
};
pub use relkit_prompt::{MenuOptions, menu};
pub use relkit_runner::{CommandRunner, CommandSpec, RunOptions, RunResult, RunnerError, Verbosity};
pub use relkit_sink::{LineSink, SinkError, SinkInitError};
pub use relkit_utils::{
    ExitCode, FailureClass, FatalReport, GlobOptions, GlobSort, MacBundle, Platform, RelkitError,
    RequirementKind, Session, file_is_binary, mac_bundle, os_binpath, os_glob, os_home, os_parent,
    os_tempfile, script_path, to_bool, to_int,
};
