use std::sync::Arc;

use camino::Utf8PathBuf;

use crate::error::ConfigError;

use super::{ConfigSource, MessageCallback, Settings};

impl Settings {
    /// Create a builder for programmatic configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relkit_config::Settings;
    ///
    /// let settings = Settings::builder()
    ///     .batch_threshold(5)
    ///     .max_width(100)
    ///     .trace_callback(|batch: &str| eprint!("{batch}"))
    ///     .build()
    ///     .expect("valid settings");
    ///
    /// assert_eq!(settings.max_width, 100);
    /// assert!(settings.trace_callback.is_some());
    /// ```
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }
}

/// Builder for [`Settings`].
///
/// Values set here are attributed to [`ConfigSource::Programmatic`].
#[derive(Clone, Default)]
pub struct SettingsBuilder {
    base: Option<Settings>,
    exit_callback: Option<MessageCallback>,
    trace_callback: Option<MessageCallback>,
    batch_callback: Option<MessageCallback>,
    batch_threshold: Option<i64>,
    process_log_file: Option<Utf8PathBuf>,
    show_traceback: Option<bool>,
    show_traceback_entrypoint: Option<bool>,
    required_verbose: Option<bool>,
    max_width: Option<usize>,
}

impl SettingsBuilder {
    /// Create a builder with no values set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already resolved settings (e.g. the result of discovery)
    /// instead of the built-in defaults.
    #[must_use]
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            base: Some(settings),
            ..Self::default()
        }
    }

    /// Invoked with the rendered error block of every reported error.
    #[must_use]
    pub fn exit_callback(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.exit_callback = Some(Arc::new(callback));
        self
    }

    /// Receives batches of captured process output.
    #[must_use]
    pub fn trace_callback(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.trace_callback = Some(Arc::new(callback));
        self
    }

    /// Receives batches of captured process output before the trace callback.
    #[must_use]
    pub fn batch_callback(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.batch_callback = Some(Arc::new(callback));
        self
    }

    /// Lines per batch. Values below 1 behave as 1.
    #[must_use]
    pub fn batch_threshold(mut self, threshold: i64) -> Self {
        self.batch_threshold = Some(threshold);
        self
    }

    /// Existing file that receives every captured process line.
    #[must_use]
    pub fn process_log_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.process_log_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn show_traceback(mut self, show: bool) -> Self {
        self.show_traceback = Some(show);
        self
    }

    /// Traceback flag the entry point switches to before reporting an
    /// interrupt or an unexpected failure.
    #[must_use]
    pub fn show_traceback_entrypoint(mut self, show: bool) -> Self {
        self.show_traceback_entrypoint = Some(show);
        self
    }

    #[must_use]
    pub fn required_verbose(mut self, verbose: bool) -> Self {
        self.required_verbose = Some(verbose);
        self
    }

    /// Display width (must be > 0).
    #[must_use]
    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Build the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero display width.
    pub fn build(self) -> Result<Settings, ConfigError> {
        let mut settings = self.base.unwrap_or_default();
        let attribution = &mut settings.source_attribution;
        let mut mark = |key: &str| {
            attribution.insert(key.to_string(), ConfigSource::Programmatic);
        };

        if let Some(threshold) = self.batch_threshold {
            settings.batch_threshold = threshold;
            mark("batch_threshold");
        }
        if let Some(path) = self.process_log_file {
            settings.process_log_file = Some(path);
            mark("process_log_file");
        }
        if let Some(show) = self.show_traceback {
            settings.show_traceback = show;
            mark("show_traceback");
        }
        if let Some(show) = self.show_traceback_entrypoint {
            settings.show_traceback_entrypoint = show;
            mark("show_traceback_entrypoint");
        }
        if let Some(verbose) = self.required_verbose {
            settings.required_verbose = verbose;
            mark("required_verbose");
        }
        if let Some(width) = self.max_width {
            settings.max_width = width;
            mark("max_width");
        }

        if self.exit_callback.is_some() {
            settings.exit_callback = self.exit_callback;
        }
        if self.trace_callback.is_some() {
            settings.trace_callback = self.trace_callback;
        }
        if self.batch_callback.is_some() {
            settings.batch_callback = self.batch_callback;
        }

        if settings.max_width == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_width".to_string(),
                value: "0 (must be greater than 0)".to_string(),
            });
        }

        Ok(settings)
    }
}
