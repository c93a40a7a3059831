//! Command-line interface for relkit
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch

pub mod args;
mod run;

pub use args::{AwsCommands, Cli, Commands, RunArgs, build_cli};
pub use run::{run, run_with};
