use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};

use relkit_config::{MessageCallback, Settings};
use relkit_sink::{BatchCallback, LineSink, SinkError, SinkInitError};
use tracing::debug;

use crate::boxes::HeaderOptions;
use crate::report::{CONTINUE_MARKER, FailureCause, render_error_block};
use crate::text::fill_template;

/// Cloneable handle on the process stdout, one per sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl Write for StdoutWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Session console: settings plus the default and trace sinks.
///
/// Both sinks are created eagerly in [`Console::new`] and live as long as the
/// console. The default sink has no batch receiver and a threshold of 1. The
/// trace sink appends to `settings.process_log_file`, batches by
/// `settings.batch_threshold` and hands each batch to the batch callback and
/// then the trace callback.
pub struct Console {
    settings: Settings,
    default_sink: LineSink,
    trace_sink: LineSink,
}

impl Console {
    /// Create a console writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns [`SinkInitError`] when `process_log_file` does not exist.
    pub fn new(settings: Settings) -> Result<Self, SinkInitError> {
        Self::with_writer(settings, StdoutWriter)
    }

    /// Create a console whose sinks both write to clones of `writer`.
    pub fn with_writer<W>(settings: Settings, writer: W) -> Result<Self, SinkInitError>
    where
        W: Write + Clone + 'static,
    {
        let default_sink = LineSink::new(None, 1, None)?.with_writer(writer.clone());
        let trace_sink = LineSink::new(
            settings.process_log_file.clone(),
            settings.batch_threshold,
            batch_fanout(&settings),
        )?
        .with_writer(writer);

        debug!(
            threshold = trace_sink.threshold(),
            log_file = ?settings.process_log_file,
            "console sinks ready"
        );

        Ok(Self {
            settings,
            default_sink,
            trace_sink,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn max_width(&self) -> usize {
        self.settings.max_width
    }

    pub fn set_show_traceback(&mut self, show: bool) {
        self.settings.show_traceback = show;
    }

    /// Trace sink, used by the command runner for process output.
    pub fn trace_sink_mut(&mut self) -> &mut LineSink {
        &mut self.trace_sink
    }

    /// Send raw text through the default sink.
    pub fn emit(&mut self, text: &str) -> Result<(), SinkError> {
        self.default_sink.send(text)
    }

    /// `· {msg}\n`
    pub fn log_info(&mut self, msg: &str) -> Result<(), SinkError> {
        self.log_with_prefix(msg, "· ", "\n")
    }

    pub fn log_with_prefix(
        &mut self,
        msg: &str,
        prefix: &str,
        ending: &str,
    ) -> Result<(), SinkError> {
        self.emit(&format!("{prefix}{msg}{ending}"))
    }

    pub fn println(&mut self, msg: &str) -> Result<(), SinkError> {
        self.log_with_prefix(msg, "", "\n")
    }

    pub fn print(&mut self, msg: &str) -> Result<(), SinkError> {
        self.emit(msg)
    }

    /// Send a line through the trace sink.
    pub fn trace(&mut self, line: &str) -> Result<(), SinkError> {
        self.trace_sink.send(line)
    }

    /// Deliver the trace sink's partial batch; the sink stays open.
    pub fn end_trace_batch(&mut self) {
        self.trace_sink.flush_batch();
    }

    /// Fill `template` to the current display width.
    #[must_use]
    pub fn fill(&self, template: &str, sep: &str, values: &[(&str, &str)]) -> String {
        fill_template(template, sep, values, self.settings.max_width)
    }

    pub fn println_fill(
        &mut self,
        template: &str,
        sep: &str,
        values: &[(&str, &str)],
    ) -> Result<(), SinkError> {
        let line = self.fill(template, sep, values);
        self.println(&line)
    }

    pub fn print_fill(
        &mut self,
        template: &str,
        sep: &str,
        values: &[(&str, &str)],
    ) -> Result<(), SinkError> {
        let line = self.fill(template, sep, values);
        self.print(&line)
    }

    /// Three-line box around the upper-cased `msg`, filled to the display width.
    pub fn print_header(&mut self, msg: &str, options: &HeaderOptions) -> Result<(), SinkError> {
        let theme = &options.theme;
        let bottom_left = if options.is_tree {
            theme.junction
        } else {
            theme.bottom_left
        };
        let fill_char = if options.fill_char.is_empty() {
            " "
        } else {
            options.fill_char.as_str()
        };
        let title = msg.to_uppercase();

        self.print(&options.pre)?;
        self.print_fill(
            "{tl}{s}{tr}\n",
            theme.horizontal,
            &[("tl", theme.top_left), ("tr", theme.top_right)],
        )?;
        self.print_fill(
            "{ml} {s} {m} {s} {mr}\n",
            fill_char,
            &[("m", &title), ("ml", theme.vertical), ("mr", theme.vertical)],
        )?;
        self.print_fill(
            "{bl}{s}{br}\n",
            theme.horizontal,
            &[("bl", bottom_left), ("br", theme.bottom_right)],
        )?;
        self.print(&options.post)
    }

    /// Run `f` with a temporary display width, restoring the previous one.
    pub fn with_width<R>(&mut self, width: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.settings.max_width, width);
        let result = f(self);
        self.settings.max_width = previous;
        result
    }

    /// Report an error and carry on.
    pub fn log_error(&mut self, msg: &str, cause: Option<&FailureCause>) -> Result<(), SinkError> {
        self.write_error_block(msg, cause)?;
        self.emit(CONTINUE_MARKER)
    }

    /// Report an error that ends the program. The caller decides how to exit.
    pub fn report_fatal(
        &mut self,
        msg: &str,
        cause: Option<&FailureCause>,
    ) -> Result<(), SinkError> {
        self.write_error_block(msg, cause)
    }

    fn write_error_block(
        &mut self,
        msg: &str,
        cause: Option<&FailureCause>,
    ) -> Result<(), SinkError> {
        let block = render_error_block(msg, cause);
        self.emit(&block)?;

        if let Some(callback) = &self.settings.exit_callback {
            callback(&block);
        }

        if self.settings.show_traceback {
            let backtrace = Backtrace::force_capture();
            self.emit(&format!("\n{backtrace}\n"))?;
        }

        Ok(())
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("settings", &self.settings)
            .field("default_sink", &self.default_sink)
            .field("trace_sink", &self.trace_sink)
            .finish()
    }
}

fn batch_fanout(settings: &Settings) -> Option<BatchCallback> {
    let receivers: Vec<MessageCallback> = [&settings.batch_callback, &settings.trace_callback]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    if receivers.is_empty() {
        return None;
    }

    Some(Box::new(move |batch: &str| {
        for receiver in &receivers {
            receiver(batch);
        }
    }))
}
