use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, PipeReader};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use relkit_console::Console;
use tracing::debug;

use crate::command_spec::CommandSpec;
use crate::error::RunnerError;
use crate::interrupt::InterruptGuard;
use crate::options::{RunOptions, Verbosity};
use crate::process::RunResult;

// ============================================================================
// CommandRunner - launch, tee, wait, apply failure policy
// ============================================================================

/// Runs one command at a time, teeing its output through the console.
///
/// The runner owns the session's environment overrides. Every child receives
/// a snapshot of the current process environment with the overrides applied
/// on top, so helpers such as `env_path_add` never mutate the process
/// environment itself.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    env_overrides: BTreeMap<OsString, OsString>,
}

impl CommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable for every later child process.
    pub fn set_env(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.env_overrides.insert(key.into(), value.into());
    }

    /// Value a child would see for `key`.
    #[must_use]
    pub fn env_var(&self, key: impl AsRef<OsStr>) -> Option<OsString> {
        let key = key.as_ref();
        self.env_overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var_os(key))
    }

    #[must_use]
    pub fn env_overrides(&self) -> &BTreeMap<OsString, OsString> {
        &self.env_overrides
    }

    /// Put `paths` in front of the children's `PATH`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidPath`] when an entry contains the
    /// platform path separator.
    pub fn prepend_path<I, P>(&mut self, paths: I) -> Result<(), RunnerError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut entries: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if let Some(current) = self.env_var("PATH") {
            entries.extend(std::env::split_paths(&current));
        }
        let joined = std::env::join_paths(entries).map_err(|err| RunnerError::InvalidPath {
            reason: err.to_string(),
        })?;
        self.set_env("PATH", joined);
        Ok(())
    }

    /// Snapshot of the environment a child receives.
    #[must_use]
    pub fn environment(&self) -> BTreeMap<OsString, OsString> {
        let mut env: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
        env.extend(
            self.env_overrides
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        env
    }

    /// Run `spec` to completion.
    ///
    /// The command line is logged with an `@ ` prefix unless silent. Output
    /// is read line by line; every line lands in
    /// [`RunResult::stdout_text`] and, at [`Verbosity::Stream`], goes through
    /// the console's trace sink, whose partial batch is delivered once the
    /// output ends.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::CommandFailed`] for a non-zero exit unless
    ///   `options.permissive` is set
    /// - [`RunnerError::SpawnFailed`] when the program cannot be launched
    /// - [`RunnerError::Interrupted`] when SIGINT arrived during the run
    /// - [`RunnerError::Io`] or [`RunnerError::Sink`] when output handling fails
    pub fn run(
        &self,
        console: &mut Console,
        spec: &CommandSpec,
        options: &RunOptions,
    ) -> Result<RunResult, RunnerError> {
        let program = spec.program_name();
        let command_line = spec.display();

        if options.verbosity > Verbosity::Silent {
            console.log_with_prefix(&command_line, "@ ", "\n")?;
        }
        debug!(
            command = %command_line,
            verbosity = options.verbosity.level(),
            permissive = options.permissive,
            "running command"
        );

        let (reader, writer) = std::io::pipe().map_err(|source| io_error(&program, source))?;
        let mut command = spec.to_command_with_env(&self.environment());
        command.stdin(Stdio::inherit());
        command.stdout(
            writer
                .try_clone()
                .map_err(|source| io_error(&program, source))?,
        );
        if options.merge_stderr {
            command.stderr(writer);
        } else {
            command.stderr(Stdio::inherit());
            drop(writer);
        }

        let guard = InterruptGuard::install();
        let spawned = command.spawn();
        // Our copies of the write end must close or the read never sees EOF.
        drop(command);
        let mut child = spawned.map_err(|source| RunnerError::SpawnFailed {
            program: program.clone(),
            source,
        })?;

        let stdout_text = match read_lines(console, reader, options.verbosity, &program) {
            Ok(text) => text,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                console.end_trace_batch();
                return Err(err);
            }
        };
        console.end_trace_batch();

        let status = child.wait().map_err(|source| io_error(&program, source))?;
        let interrupted = guard.take();
        drop(guard);
        if interrupted {
            return Err(RunnerError::Interrupted { program });
        }

        let exit_code = exit_code_of(status);
        debug!(command = %command_line, exit_code, "command finished");

        if exit_code != 0 {
            let message = failure_message(options, exit_code, &stdout_text);
            if !options.permissive {
                return Err(RunnerError::CommandFailed {
                    message,
                    exit_code,
                    stdout: stdout_text,
                });
            }
            if options.verbosity >= Verbosity::Stream {
                console.log_info(&message)?;
            }
        }

        Ok(RunResult::new(exit_code, stdout_text))
    }
}

fn io_error(program: &str, source: std::io::Error) -> RunnerError {
    RunnerError::Io {
        program: program.to_string(),
        source,
    }
}

fn read_lines(
    console: &mut Console,
    reader: PipeReader,
    verbosity: Verbosity,
    program: &str,
) -> Result<String, RunnerError> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| io_error(program, source))?;
        if read == 0 {
            break;
        }

        let line = decode_line(&buf);
        text.push_str(&line);
        if verbosity >= Verbosity::Stream {
            console.trace(&line)?;
        }
    }

    Ok(text)
}

/// Lossy UTF-8 decode with `\r\n` normalised to `\n`.
fn decode_line(bytes: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(bytes).into_owned();
    if line.ends_with("\r\n") {
        line.truncate(line.len() - 2);
        line.push('\n');
    }
    line
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn failure_message(options: &RunOptions, exit_code: i32, stdout_text: &str) -> String {
    let context = if options.error_context.is_empty() {
        String::new()
    } else {
        format!("{}. ", options.error_context)
    };
    let output = if !stdout_text.is_empty() && options.verbosity < Verbosity::Stream {
        format!("\n{stdout_text}")
    } else {
        String::new()
    };
    format!("{context}Command failed with return code: {exit_code}{output}")
}
