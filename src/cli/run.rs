//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Initializes diagnostics and discovers Settings
//! - Dispatches the subcommand inside the relkit entry point

use anyhow::Context;
use clap::Parser;

use relkit_config::Settings;
use relkit_console::{BoxTheme, HeaderOptions};
use relkit_integrations::{AwsAuthRequest, QtInfo, aws_auth, aws_copy_file, zip_it};
use relkit_prompt::{MenuOptions, menu};
use relkit_runner::{CommandSpec, RunOptions, Verbosity};
use relkit_utils::logging::init_tracing;
use relkit_utils::{ExitCode, GlobOptions, RelkitError, Session, os_glob};
use tracing::debug;

use super::args::{AwsCommands, Cli, Commands, RequireKind, RunArgs};
use crate::entrypoint::entrypoint;

/// Main CLI execution function.
///
/// Handles all output, errors included, and returns the process exit code.
/// main.rs only calls `std::process::exit(code.as_i32())`.
#[must_use]
pub fn run() -> ExitCode {
    run_with(Cli::parse())
}

/// Dispatch an already parsed command line.
pub fn run_with(cli: Cli) -> ExitCode {
    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("warning: diagnostics disabled: {err}");
    }

    let settings = match Settings::discover(&cli.overrides()) {
        Ok(settings) => settings,
        Err(err) => {
            let err = RelkitError::from(err);
            eprint!("{}", err.display_for_user());
            return err.to_exit_code();
        }
    };
    debug!(?settings, "settings resolved");

    // Outcomes that are not failures but still exit non-zero, like an
    // abandoned menu.
    let mut status = ExitCode::SUCCESS;
    let code = entrypoint(settings, |session| {
        status = dispatch(session, cli.command)?;
        Ok(())
    });

    if code.is_success() { status } else { code }
}

fn dispatch(session: &mut Session, command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Run(args) => run_command(session, &args),
        Commands::Menu {
            options,
            header,
            prompt,
            starts_at,
        } => {
            let menu_options = MenuOptions {
                header,
                prompt,
                starts_at,
            };
            match menu(session, &options, &menu_options)? {
                Some(choice) => {
                    session.console_mut().println(&choice)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        Commands::Require { kind, item, info } => {
            match kind {
                RequireKind::Command => session.required_command(&item, &info)?,
                RequireKind::File => session.required_file(&item, &info)?,
                RequireKind::Folder => session.required_folder(&item, &info)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Glob {
            pattern,
            sort,
            reverse,
            info,
        } => {
            let options = GlobOptions {
                sort: sort.into(),
                reverse,
                info,
            };
            let found = os_glob(&pattern, &options)?;
            session.console_mut().println(&found)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Header { title, style, tree } => {
            let options = HeaderOptions {
                pre: String::new(),
                is_tree: tree,
                theme: BoxTheme::get(style.into()),
                ..HeaderOptions::default()
            };
            session.console_mut().print_header(&title, &options)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Zip { dst, src } => {
            session.required_command("7z", "Install 7-Zip (p7zip on Linux and macOS)")?;
            zip_it(session, &dst, &src)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Aws(aws) => run_aws(session, aws),
        Commands::QtInfo => {
            let qt = QtInfo::discover(session)?;
            let console = session.console_mut();
            console.println(&format!("path: {}", qt.path))?;
            console.println(&format!("tools: {}", qt.tools_path))?;
            console.println(&format!("plugins: {}", qt.plugins_path))?;
            console.println(&format!("deployqt: {}", qt.deployqt))?;
            console.println(&format!("cmake: {}", qt.cmake_defs.join(" ")))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            print_settings(session)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_command(session: &mut Session, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let mut spec = CommandSpec::from_argv(&args.argv)
        .context("run needs a command")?
        .shell(args.shell)
        .line_buffered(args.line_buffered);
    if let Some(cwd) = &args.cwd {
        spec = spec.cwd(cwd);
    }

    let options = RunOptions::new()
        .verbosity(Verbosity::from_level(args.verbosity))
        .permissive(args.permissive)
        .error_context(args.context.clone())
        .merge_stderr(!args.no_merge);

    let result = session.run(&spec, &options)?;
    debug!(exit_code = result.exit_code, "run finished");
    Ok(ExitCode::SUCCESS)
}

fn run_aws(session: &mut Session, command: AwsCommands) -> anyhow::Result<ExitCode> {
    match command {
        AwsCommands::Copy {
            file,
            s3_path,
            content_type,
        } => {
            aws_copy_file(session, &file, &s3_path, content_type.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        AwsCommands::Auth {
            certificate,
            private_key,
            trust_anchor_arn,
            profile_arn,
            role_arn,
            info,
            command,
        } => {
            let request = AwsAuthRequest {
                certificate,
                private_key,
                trust_anchor_arn,
                profile_arn,
                role_arn,
                info,
            };
            let credentials = aws_auth(session, &request)?;
            session.log_info(&format!("AWS credentials for {}", credentials.access_key_id))?;

            if let Some(spec) = CommandSpec::from_argv(&command) {
                session.run(&spec, &RunOptions::new())?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_settings(session: &mut Session) -> Result<(), RelkitError> {
    let settings = session.settings().clone();
    let rows = [
        ("batch_threshold", settings.batch_threshold.to_string()),
        (
            "process_log_file",
            settings
                .process_log_file
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
        ),
        ("show_traceback", settings.show_traceback.to_string()),
        (
            "show_traceback_entrypoint",
            settings.show_traceback_entrypoint.to_string(),
        ),
        ("required_verbose", settings.required_verbose.to_string()),
        ("max_width", settings.max_width.to_string()),
    ];

    let console = session.console_mut();
    for (key, value) in rows {
        let source = settings
            .source_of(key)
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        console.println(&format!("{key} = {value}  [{source}]"))?;
    }
    Ok(())
}
