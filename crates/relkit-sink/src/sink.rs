use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::trace;

use crate::error::{SinkError, SinkInitError};

/// Receiver for accumulated batch text.
pub type BatchCallback = Box<dyn FnMut(&str)>;

// ============================================================================
// LineSink - console / file / batch tee
// ============================================================================

/// Stateful consumer of text lines.
///
/// Every non-empty line is written to the console writer straight away and,
/// when a log file is configured, appended to that file. Lines also accumulate
/// in a pending batch; once `threshold` lines are pending the batch text goes
/// to the batch callback and the batch starts over.
///
/// Invariants:
/// - `pending_text` is exactly the concatenation of lines received since the
///   last flush
/// - `pending_line_count` is the number of non-empty lines since the last flush
///
/// Any partial batch is delivered exactly once on [`close`](Self::close),
/// [`flush_batch`](Self::flush_batch) or drop.
///
/// # Example
///
/// ```rust
/// use relkit_sink::LineSink;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let batches = Rc::new(RefCell::new(Vec::new()));
/// let seen = Rc::clone(&batches);
/// let mut sink = LineSink::new(None, 2, Some(Box::new(move |text: &str| {
///     seen.borrow_mut().push(text.to_string());
/// })))
/// .unwrap()
/// .with_writer(std::io::sink());
///
/// sink.send("a\n").unwrap();
/// sink.send("b\n").unwrap();
/// sink.send("c\n").unwrap();
/// sink.close();
///
/// assert_eq!(*batches.borrow(), vec!["a\nb\n".to_string(), "c\n".to_string()]);
/// ```
pub struct LineSink {
    writer: Box<dyn Write>,
    file_path: Option<Utf8PathBuf>,
    threshold: usize,
    batch_callback: Option<BatchCallback>,
    pending_line_count: usize,
    pending_text: String,
}

impl LineSink {
    /// Create a sink writing to stdout.
    ///
    /// Thresholds below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns [`SinkInitError`] when `file_path` is set but no such file
    /// exists. The file is never created by the sink.
    pub fn new(
        file_path: Option<Utf8PathBuf>,
        threshold: i64,
        batch_callback: Option<BatchCallback>,
    ) -> Result<Self, SinkInitError> {
        if let Some(path) = &file_path
            && !path.is_file()
        {
            return Err(SinkInitError { path: path.clone() });
        }

        Ok(Self {
            writer: Box::new(io::stdout()),
            file_path,
            threshold: clamp_threshold(threshold),
            batch_callback,
            pending_line_count: 0,
            pending_text: String::new(),
        })
    }

    /// Replace the console writer (stdout by default).
    #[must_use]
    pub fn with_writer(mut self, writer: impl Write + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Feed one line into the sink.
    ///
    /// Lines are forwarded verbatim, so callers include their own trailing
    /// newline. Empty lines are not forwarded but still trigger the threshold
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the console write or the log file append
    /// fails. The line is not counted into the batch in that case.
    pub fn send(&mut self, line: &str) -> Result<(), SinkError> {
        if !line.is_empty() {
            self.writer
                .write_all(line.as_bytes())
                .and_then(|()| self.writer.flush())
                .map_err(|source| SinkError::Console { source })?;

            if let Some(path) = &self.file_path {
                append_line(path, line).map_err(|source| SinkError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            }

            self.pending_line_count += 1;
            self.pending_text.push_str(line);
        }

        if self.pending_line_count >= self.threshold {
            self.deliver();
        }

        Ok(())
    }

    /// Deliver any partial batch to the callback and start a new batch.
    ///
    /// Unlike [`close`](Self::close) the sink stays usable afterwards.
    pub fn flush_batch(&mut self) {
        self.deliver();
    }

    /// Deliver any partial batch and stop accepting input.
    pub fn close(mut self) {
        self.deliver();
    }

    /// Effective threshold after clamping.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Log file every line is appended to, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&Utf8Path> {
        self.file_path.as_deref()
    }

    /// Number of lines received since the last flush.
    #[must_use]
    pub fn pending_line_count(&self) -> usize {
        self.pending_line_count
    }

    /// Text received since the last flush.
    #[must_use]
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    fn deliver(&mut self) {
        if !self.pending_text.is_empty()
            && let Some(callback) = self.batch_callback.as_mut()
        {
            trace!(
                lines = self.pending_line_count,
                bytes = self.pending_text.len(),
                "delivering sink batch"
            );
            callback(&self.pending_text);
        }
        self.pending_line_count = 0;
        self.pending_text.clear();
    }
}

impl Drop for LineSink {
    fn drop(&mut self) {
        self.deliver();
    }
}

impl fmt::Debug for LineSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineSink")
            .field("file_path", &self.file_path)
            .field("threshold", &self.threshold)
            .field("has_batch_callback", &self.batch_callback.is_some())
            .field("pending_line_count", &self.pending_line_count)
            .finish_non_exhaustive()
    }
}

fn clamp_threshold(threshold: i64) -> usize {
    usize::try_from(threshold.max(1)).unwrap_or(usize::MAX)
}

/// The file is reopened for every line so a killed process still leaves every
/// fully sent line on disk.
fn append_line(path: &Utf8Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn recording_sink(threshold: i64) -> (LineSink, Rc<RefCell<Vec<String>>>, SharedBuffer) {
        let batches = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&batches);
        let console = SharedBuffer::default();
        let sink = LineSink::new(
            None,
            threshold,
            Some(Box::new(move |text: &str| {
                seen.borrow_mut().push(text.to_string());
            })),
        )
        .unwrap()
        .with_writer(console.clone());
        (sink, batches, console)
    }

    #[test]
    fn test_threshold_three_flushes_once_then_remainder_on_close() {
        let (mut sink, batches, _console) = recording_sink(3);

        sink.send("a\n").unwrap();
        sink.send("b\n").unwrap();
        assert!(batches.borrow().is_empty());

        sink.send("c\n").unwrap();
        assert_eq!(*batches.borrow(), vec!["a\nb\nc\n"]);

        sink.send("d\n").unwrap();
        assert_eq!(batches.borrow().len(), 1);

        sink.close();
        assert_eq!(*batches.borrow(), vec!["a\nb\nc\n", "d\n"]);
    }

    #[test]
    fn test_close_after_exact_multiple_adds_nothing() {
        let (mut sink, batches, _console) = recording_sink(2);
        for line in ["1\n", "2\n", "3\n", "4\n"] {
            sink.send(line).unwrap();
        }
        sink.close();
        assert_eq!(*batches.borrow(), vec!["1\n2\n", "3\n4\n"]);
    }

    #[test]
    fn test_lines_reach_console_immediately() {
        let (mut sink, _batches, console) = recording_sink(10);
        sink.send("first\n").unwrap();
        assert_eq!(console.contents(), "first\n");
        sink.send("second\n").unwrap();
        assert_eq!(console.contents(), "first\nsecond\n");
    }

    #[test]
    fn test_empty_line_is_not_forwarded_or_counted() {
        let (mut sink, batches, console) = recording_sink(2);
        sink.send("x\n").unwrap();
        sink.send("").unwrap();
        assert_eq!(sink.pending_line_count(), 1);
        assert_eq!(console.contents(), "x\n");
        assert!(batches.borrow().is_empty());
    }

    #[test]
    fn test_zero_and_negative_thresholds_clamp_to_one() {
        for threshold in [0, -1, -50] {
            let (mut sink, batches, _console) = recording_sink(threshold);
            assert_eq!(sink.threshold(), 1);
            sink.send("a\n").unwrap();
            sink.send("b\n").unwrap();
            assert_eq!(*batches.borrow(), vec!["a\n", "b\n"]);
        }
    }

    #[test]
    fn test_flush_batch_keeps_sink_usable() {
        let (mut sink, batches, _console) = recording_sink(5);
        sink.send("one\n").unwrap();
        sink.flush_batch();
        assert_eq!(*batches.borrow(), vec!["one\n"]);
        assert_eq!(sink.pending_line_count(), 0);
        assert_eq!(sink.pending_text(), "");

        sink.send("two\n").unwrap();
        sink.flush_batch();
        sink.flush_batch();
        assert_eq!(*batches.borrow(), vec!["one\n", "two\n"]);
    }

    #[test]
    fn test_drop_delivers_partial_batch() {
        let (mut sink, batches, _console) = recording_sink(4);
        sink.send("tail\n").unwrap();
        drop(sink);
        assert_eq!(*batches.borrow(), vec!["tail\n"]);
    }

    #[test]
    fn test_sink_without_callback_still_resets() {
        let mut sink = LineSink::new(None, 2, None)
            .unwrap()
            .with_writer(io::sink());
        sink.send("a\n").unwrap();
        sink.send("b\n").unwrap();
        assert_eq!(sink.pending_line_count(), 0);
        assert!(sink.pending_text().is_empty());
    }

    #[test]
    fn test_missing_log_file_fails_at_creation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Utf8PathBuf::from_path_buf(dir.path().join("missing.log")).unwrap();

        let err = LineSink::new(Some(missing.clone()), 1, None).unwrap_err();
        assert_eq!(err.path, missing);
        assert!(err.to_string().contains("missing.log"));
        assert!(!missing.exists(), "sink must not create the log file");
    }

    #[test]
    fn test_log_file_receives_every_line_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = Utf8PathBuf::from_path_buf(dir.path().join("process.log")).unwrap();
        std::fs::write(&log, "existing\n").unwrap();

        let mut sink = LineSink::new(Some(log.clone()), 3, None)
            .unwrap()
            .with_writer(io::sink());
        sink.send("alpha\n").unwrap();
        sink.send("").unwrap();
        sink.send("beta\n").unwrap();

        // Visible on disk before the batch is flushed.
        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "existing\nalpha\nbeta\n"
        );
        sink.close();
    }

    #[test]
    fn test_log_file_removed_mid_stream_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = Utf8PathBuf::from_path_buf(dir.path().join("gone.log")).unwrap();
        std::fs::write(&log, "").unwrap();

        let mut sink = LineSink::new(Some(log.clone()), 1, None)
            .unwrap()
            .with_writer(io::sink());
        std::fs::remove_file(&log).unwrap();

        match sink.send("line\n") {
            Err(SinkError::LogFile { path, .. }) => assert_eq!(path, log),
            other => panic!("expected LogFile error, got {other:?}"),
        }
        assert_eq!(sink.pending_line_count(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_batches_partition_the_input(
                lines in proptest::collection::vec("[a-z]{1,8}\n", 0..40),
                threshold in 1i64..8,
            ) {
                let (mut sink, batches, _console) = recording_sink(threshold);
                for line in &lines {
                    sink.send(line).unwrap();
                }
                let t = usize::try_from(threshold).unwrap();
                prop_assert_eq!(batches.borrow().len(), lines.len() / t);
                sink.close();

                let expected_flushes = lines.len() / t + usize::from(lines.len() % t != 0);
                let recorded = batches.borrow();
                prop_assert_eq!(recorded.len(), expected_flushes);
                for (i, chunk) in lines.chunks(t).enumerate() {
                    prop_assert_eq!(&recorded[i], &chunk.concat());
                }
            }
        }
    }
}
