//! Diagnostic logging for relkit
//!
//! Console output (log lines, command echo, process output) goes through the
//! session sinks. This module only sets up `tracing` for internal diagnostics,
//! written to stderr so captured stdout stays clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV_VAR: &str = "RELKIT_LOG";

/// Filter used when `RELKIT_LOG` is unset or invalid.
#[must_use]
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "relkit=debug,relkit_runner=debug,relkit_console=debug,warn"
    } else {
        "relkit=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// The filter comes from `RELKIT_LOG`, falling back to
/// [`default_directive`]. Verbose mode adds targets and span close events.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(fmt::format::FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}
