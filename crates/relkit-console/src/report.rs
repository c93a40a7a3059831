//! Error block rendering

use std::fmt;

/// Marker printed after a non-fatal error block
pub const CONTINUE_MARKER: &str = "- - - - - Execution will continue below - - - - -\n";

/// Underlying cause attached to a reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureCause {
    /// Short category of the cause (e.g. `io`, `runner`, `panic`)
    pub kind: String,
    /// Human readable detail, usually the error chain
    pub detail: String,
}

impl FailureCause {
    #[must_use]
    pub fn new(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Build a cause from an error and its `source()` chain.
    #[must_use]
    pub fn from_error(kind: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(inner) = source {
            detail.push_str("\n  caused by: ");
            detail.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::new(kind, detail)
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " | {}\n{}", self.kind, self.detail)
    }
}

/// Render the error block written for every reported error:
///
/// ```text
///
///
/// @ ERROR | <message>[ | <kind>
/// <detail>]
/// ```
#[must_use]
pub fn render_error_block(message: &str, cause: Option<&FailureCause>) -> String {
    let cause = cause.map(ToString::to_string).unwrap_or_default();
    format!("\n\n@ ERROR | {message}{cause}\n")
}
