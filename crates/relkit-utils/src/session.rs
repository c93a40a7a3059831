use std::io::Write;
use std::path::PathBuf;

use relkit_config::Settings;
use relkit_console::Console;
use relkit_runner::{CommandRunner, CommandSpec, RunOptions, RunResult};
use relkit_sink::SinkInitError;

use crate::error::RelkitError;

/// Everything a build script needs: the console with its two sinks and the
/// command runner with the session's environment overrides.
#[derive(Debug)]
pub struct Session {
    console: Console,
    runner: CommandRunner,
}

impl Session {
    /// Build a session writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`SinkInitError`] when `settings.process_log_file` is missing.
    pub fn new(settings: Settings) -> Result<Self, SinkInitError> {
        Ok(Self::from_console(Console::new(settings)?))
    }

    pub fn with_writer<W>(settings: Settings, writer: W) -> Result<Self, SinkInitError>
    where
        W: Write + Clone + 'static,
    {
        Ok(Self::from_console(Console::with_writer(settings, writer)?))
    }

    #[must_use]
    pub fn from_console(console: Console) -> Self {
        Self {
            console,
            runner: CommandRunner::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.console.settings()
    }

    #[must_use]
    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    #[must_use]
    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut CommandRunner {
        &mut self.runner
    }

    /// Run a command through the session console.
    pub fn run(
        &mut self,
        spec: &CommandSpec,
        options: &RunOptions,
    ) -> Result<RunResult, RelkitError> {
        Ok(self.runner.run(&mut self.console, spec, options)?)
    }

    /// `· {msg}` through the default sink.
    pub fn log_info(&mut self, msg: &str) -> Result<(), RelkitError> {
        Ok(self.console.log_info(msg)?)
    }

    /// Prepend directories to `PATH` for every later command.
    pub fn env_path_add<I, P>(&mut self, paths: I) -> Result<(), RelkitError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Ok(self.runner.prepend_path(paths)?)
    }
}
