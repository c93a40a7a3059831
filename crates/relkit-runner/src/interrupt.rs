//! Operator interrupt (Ctrl-C) tracking while a child process runs
//!
//! The terminal delivers SIGINT to the whole foreground process group, so the
//! child usually dies on its own. [`InterruptGuard`] keeps the parent alive
//! long enough to notice, so the run can end with
//! [`RunnerError::Interrupted`](crate::RunnerError::Interrupted) and the entry
//! point can report it. Outside a guard the default disposition applies.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Record an interrupt as if SIGINT had been received.
pub fn request_interrupt() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Read and clear the interrupt flag.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Installs the SIGINT handler for its lifetime and restores the previous
/// disposition on drop. A no-op on non-unix targets.
#[must_use = "the handler is removed when the guard is dropped"]
pub struct InterruptGuard {
    #[cfg(unix)]
    previous: Option<nix::sys::signal::SigAction>,
}

impl InterruptGuard {
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

            let action = SigAction::new(
                SigHandler::Handler(on_sigint),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            // SAFETY: the handler only stores into an atomic.
            let previous = match unsafe { sigaction(Signal::SIGINT, &action) } {
                Ok(previous) => Some(previous),
                Err(err) => {
                    tracing::warn!(error = %err, "could not install SIGINT handler");
                    None
                }
            };
            Self { previous }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Whether an interrupt arrived, clearing the flag.
    pub fn take(&self) -> bool {
        take_interrupt()
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(previous) = self.previous.take() {
            // SAFETY: restores the disposition that was active before install.
            let restored =
                unsafe { nix::sys::signal::sigaction(nix::sys::signal::Signal::SIGINT, &previous) };
            if let Err(err) = restored {
                tracing::warn!(error = %err, "could not restore SIGINT handler");
            }
        }
    }
}

