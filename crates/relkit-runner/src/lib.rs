//! Command execution for relkit
//!
//! [`CommandRunner::run`] launches one external process described by a
//! [`CommandSpec`], merges its stderr into stdout, tees every output line
//! through the [`Console`](relkit_console::Console) trace sink and applies the
//! failure policy from [`RunOptions`]: a non-zero exit is an error unless the
//! run is permissive.
//!
//! Runs are synchronous. The only blocking point is the line read; an
//! operator interrupt received meanwhile ends the run with
//! [`RunnerError::Interrupted`].

pub mod command_spec;
pub mod error;
pub mod interrupt;
pub mod options;
pub mod process;
pub mod runner;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use interrupt::{InterruptGuard, request_interrupt, take_interrupt};
pub use options::{RunOptions, Verbosity};
pub use process::RunResult;
pub use runner::CommandRunner;
