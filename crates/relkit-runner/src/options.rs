//! Per-invocation run options

/// How much of a run is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Nothing is logged; output is only captured
    Silent,
    /// The command line is logged
    Command,
    /// The command line is logged and output is streamed through the trace sink
    #[default]
    Stream,
}

impl Verbosity {
    /// Map a numeric level: `<= 0` silent, `1` command, `>= 2` stream.
    #[must_use]
    pub const fn from_level(level: i64) -> Self {
        if level <= 0 {
            Self::Silent
        } else if level == 1 {
            Self::Command
        } else {
            Self::Stream
        }
    }

    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Silent => 0,
            Self::Command => 1,
            Self::Stream => 2,
        }
    }
}

/// Options of a single [`CommandRunner::run`](crate::CommandRunner::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Prepended to the failure message as `"{error_context}. "`
    pub error_context: String,
    pub verbosity: Verbosity,
    /// Return non-zero exits to the caller instead of failing
    pub permissive: bool,
    /// Send stderr into the captured stdout stream
    pub merge_stderr: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            error_context: String::new(),
            verbosity: Verbosity::Stream,
            permissive: false,
            merge_stderr: true,
        }
    }
}

impl RunOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn error_context(mut self, context: impl Into<String>) -> Self {
        self.error_context = context.into();
        self
    }

    #[must_use]
    pub const fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub const fn permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    #[must_use]
    pub const fn merge_stderr(mut self, merge: bool) -> Self {
        self.merge_stderr = merge;
        self
    }
}
