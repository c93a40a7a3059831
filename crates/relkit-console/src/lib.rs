//! Console output for relkit
//!
//! [`Console`] owns the two line sinks of a session: the default sink used for
//! every ordinary log line, and the trace sink that carries captured process
//! output to the configured batch receivers. It also renders width-aware fill
//! lines, boxed headers and error blocks on top of the default sink.

pub mod boxes;
pub mod console;
pub mod report;
pub mod text;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use boxes::{BoxStyle, BoxTheme, HeaderOptions};
pub use console::{Console, StdoutWriter};
pub use report::{FailureCause, render_error_block, CONTINUE_MARKER};
pub use text::{capitalize, display_width, fill_template};
