// ============================================================================
// RunResult - outcome of a finished command
// ============================================================================

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Exit status; a child killed by a signal reports `-signal`
    pub exit_code: i32,
    /// Every line read from the child, in order, newlines included
    pub stdout_text: String,
}

impl RunResult {
    #[must_use]
    pub fn new(exit_code: i32, stdout_text: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout_text: stdout_text.into(),
        }
    }

    /// Trimmed output when the command succeeded, `None` otherwise.
    #[must_use]
    pub fn safe_stdout(&self) -> Option<&str> {
        self.success().then(|| self.stdout_text.trim())
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}
