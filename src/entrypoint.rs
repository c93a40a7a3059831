//! Top-level wrapper turning a build script's outcome into an exit status

use std::panic::{self, AssertUnwindSafe};

use relkit_config::Settings;
use relkit_runner::{InterruptGuard, take_interrupt};
use relkit_utils::{ExitCode, FatalReport, RelkitError, Session};
use tracing::error;

/// Run `main` in a fresh [`Session`] built from `settings`.
///
/// Errors and panics escaping `main` are reported through the session
/// console as a fatal error block and yield [`ExitCode::FAILURE`]. SIGINT is
/// caught for the whole of `main`; an interrupt that arrives outside a
/// command run is reported once `main` returns. Nothing here exits the
/// process.
///
/// # Example
///
/// ```no_run
/// use relkit::{CommandSpec, RunOptions, Settings, entrypoint};
///
/// let code = entrypoint(Settings::default(), |session| {
///     session.required_command("cmake", "Install CMake 3.25 or newer")?;
///     session.run(&CommandSpec::new("cmake").args(["--build", "build"]), &RunOptions::new())?;
///     Ok(())
/// });
/// std::process::exit(code.as_i32());
/// ```
pub fn entrypoint<F>(settings: Settings, main: F) -> ExitCode
where
    F: FnOnce(&mut Session) -> anyhow::Result<()>,
{
    let mut session = match Session::new(settings) {
        Ok(session) => session,
        Err(err) => {
            eprint!("{}", RelkitError::from(err).display_for_user());
            return ExitCode::FAILURE;
        }
    };
    run_in_session(&mut session, main)
}

/// [`entrypoint`] for an existing session.
pub fn run_in_session<F>(session: &mut Session, main: F) -> ExitCode
where
    F: FnOnce(&mut Session) -> anyhow::Result<()>,
{
    // Covers Ctrl-C between command runs. Each run nests its own guard.
    let guard = InterruptGuard::install();
    take_interrupt();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| main(&mut *session)));
    let interrupted = guard.take();
    drop(guard);

    let report = match outcome {
        _ if interrupted => FatalReport::from_error(&RelkitError::Interrupted),
        Ok(Ok(())) => return ExitCode::SUCCESS,
        Ok(Err(err)) => FatalReport::from_error(err.as_ref()),
        Err(payload) => FatalReport::from_panic(payload.as_ref()),
    };

    report_fatal(session, &report);
    ExitCode::FAILURE
}

fn report_fatal(session: &mut Session, report: &FatalReport) {
    error!(class = ?report.class, message = %report.message, "fatal error");

    if report.class.uses_entrypoint_traceback() {
        let show = session.settings().show_traceback_entrypoint;
        session.console_mut().set_show_traceback(show);
    }

    if let Err(sink_err) = session
        .console_mut()
        .report_fatal(&report.message, report.cause.as_ref())
    {
        // The console is gone; stderr is all that is left.
        eprintln!("{}: {sink_err}", report.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relkit_console::test_support::SharedBuffer;
    use relkit_runner::RunnerError;
    use relkit_utils::RequirementKind;
    use std::sync::{Arc, Mutex};

    fn session_with(settings: Settings) -> (Session, SharedBuffer) {
        let out = SharedBuffer::new();
        (Session::with_writer(settings, out.clone()).unwrap(), out)
    }

    #[test]
    fn test_success_is_zero_and_silent() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |session| {
            session.log_info("done")?;
            Ok(())
        });
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(out.contents(), "· done\n");
    }

    #[test]
    fn test_requirement_failure_uses_own_message() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| {
            Err(RelkitError::RequirementMissing {
                kind: RequirementKind::Command,
                item: "7z".to_string(),
                info: String::new(),
            }
            .into())
        });
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(out.contents(), "\n\n@ ERROR | Command '7z' is required.\n");
    }

    #[test]
    fn test_command_failure_inside_session_error() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| {
            let err = RunnerError::CommandFailed {
                message: "Build failed. Command failed with return code: 3".to_string(),
                exit_code: 3,
                stdout: String::new(),
            };
            Err(RelkitError::from(err).into())
        });
        assert_eq!(code, ExitCode::FAILURE);
        assert!(
            out.contents()
                .contains("@ ERROR | Build failed. Command failed with return code: 3\n")
        );
    }

    #[test]
    fn test_unexpected_error_has_cause() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| Err(anyhow::anyhow!("disk on fire")));
        assert_eq!(code, ExitCode::FAILURE);
        let text = out.contents();
        assert!(text.starts_with("\n\n@ ERROR | Unexpected | "));
        assert!(text.contains("disk on fire"));
    }

    #[test]
    fn test_interrupt_message() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| Err(RelkitError::Interrupted.into()));
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(out.contents(), "\n\n@ ERROR | User interrupts execution.\n");
    }

    #[test]
    fn test_permission_denied_message() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| {
            let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
            Err(RelkitError::from(io).into())
        });
        assert_eq!(code, ExitCode::FAILURE);
        assert!(
            out.contents()
                .starts_with("\n\n@ ERROR | Some files are in use, execution blocked | ")
        );
    }

    #[test]
    fn test_panic_is_reported() {
        let (mut session, out) = session_with(Settings::default());
        let code = run_in_session(&mut session, |_| panic!("index out of range"));
        assert_eq!(code, ExitCode::FAILURE);
        let text = out.contents();
        assert!(text.starts_with("\n\n@ ERROR | Unexpected | Panic\n"));
        assert!(text.contains("index out of range"));
    }

    #[test]
    fn test_exit_callback_receives_block() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let settings = Settings::builder()
            .exit_callback(move |block| sink.lock().unwrap().push(block.to_string()))
            .build()
            .unwrap();
        let (mut session, _out) = session_with(settings);

        run_in_session(&mut session, |_| Err(RelkitError::Interrupted.into()));
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["\n\n@ ERROR | User interrupts execution.\n".to_string()]
        );
    }

    #[test]
    fn test_entrypoint_traceback_flag_applies_to_unexpected_only() {
        let settings = Settings::builder()
            .show_traceback(true)
            .show_traceback_entrypoint(false)
            .build()
            .unwrap();

        // Reported failures keep show_traceback
        let (mut session, out) = session_with(settings.clone());
        run_in_session(&mut session, |_| {
            Err(RelkitError::GlobNoMatch {
                pattern: "*.zip".to_string(),
                info: String::new(),
            }
            .into())
        });
        assert!(out.contents().len() > "\n\n@ ERROR | Glob '*.zip' has failed.\n".len());

        // Unexpected failures switch to show_traceback_entrypoint
        let (mut session, out) = session_with(settings);
        run_in_session(&mut session, |_| Err(RelkitError::Interrupted.into()));
        assert_eq!(out.contents(), "\n\n@ ERROR | User interrupts execution.\n");
    }

    #[test]
    fn test_entrypoint_with_missing_log_file() {
        let settings = Settings::builder()
            .process_log_file("/definitely/missing/process.log")
            .build()
            .unwrap();
        let mut called = false;
        let code = entrypoint(settings, |_| {
            called = true;
            Ok(())
        });
        assert_eq!(code, ExitCode::FAILURE);
        assert!(!called);
    }
}
