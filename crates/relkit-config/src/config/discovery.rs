use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::ConfigError;

use super::{ConfigSource, Settings, SettingsFile, SettingsOverrides};

/// File name looked up in the starting directory during discovery
pub const CONFIG_FILE_NAME: &str = "relkit.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "RELKIT_CONFIG";

impl Settings {
    /// Discover and load settings with precedence: CLI > file > defaults.
    ///
    /// The configuration file is, in order: `overrides.config_path`, the path in
    /// `RELKIT_CONFIG`, or `relkit.toml` in the current directory when present.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing or any file is invalid.
    pub fn discover(overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: Utf8PathBuf::from("."),
            source,
        })?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| ConfigError::InvalidValue {
            key: "current_dir".to_string(),
            value: format!("{} is not valid UTF-8", path.display()),
        })?;
        let env_path = std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from);

        Self::discover_from(&cwd, env_path, overrides)
    }

    /// Path-driven variant of [`discover`](Self::discover) that does not read
    /// process-global state.
    pub fn discover_from(
        start_dir: &Utf8Path,
        env_path: Option<Utf8PathBuf>,
        overrides: &SettingsOverrides,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        let explicit = overrides.config_path.clone().or(env_path);
        let config_path = match explicit {
            Some(path) if path.is_file() => Some(path),
            Some(path) => return Err(ConfigError::NotFound { path }),
            None => {
                let candidate = start_dir.join(CONFIG_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };

        if let Some(path) = &config_path {
            debug!(path = %path, "loading relkit configuration file");
            let file = Self::load_config_file(path)?;
            settings.apply_layer(file, &ConfigSource::ConfigFile(path.clone()));
        }

        let cli_layer = SettingsFile {
            batch_threshold: overrides.batch_threshold,
            process_log_file: overrides.process_log_file.clone(),
            show_traceback: overrides.show_traceback,
            show_traceback_entrypoint: overrides.show_traceback_entrypoint,
            required_verbose: overrides.required_verbose,
            max_width: overrides.max_width,
        };
        settings.apply_layer(cli_layer, &ConfigSource::Cli);

        if settings.max_width == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_width".to_string(),
                value: "0 (must be greater than 0)".to_string(),
            });
        }

        Ok(settings)
    }

    /// Parse a `relkit.toml` file.
    pub fn load_config_file(path: &Utf8Path) -> Result<SettingsFile, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            reason: err.message().to_string(),
        })
    }

    fn apply_layer(&mut self, layer: SettingsFile, source: &ConfigSource) {
        let mut mark = |key: &str| {
            self.source_attribution
                .insert(key.to_string(), source.clone());
        };

        if let Some(threshold) = layer.batch_threshold {
            mark("batch_threshold");
            self.batch_threshold = threshold;
        }
        if let Some(path) = layer.process_log_file {
            mark("process_log_file");
            self.process_log_file = Some(path);
        }
        if let Some(show) = layer.show_traceback {
            mark("show_traceback");
            self.show_traceback = show;
        }
        if let Some(show) = layer.show_traceback_entrypoint {
            mark("show_traceback_entrypoint");
            self.show_traceback_entrypoint = show;
        }
        if let Some(verbose) = layer.required_verbose {
            mark("required_verbose");
            self.required_verbose = verbose;
        }
        if let Some(width) = layer.max_width {
            mark("max_width");
            self.max_width = width;
        }
    }
}
