//! Configuration for relkit sessions
//!
//! [`Settings`] is the single configuration record read by the console and the
//! command runner. It is built once, either programmatically through
//! [`SettingsBuilder`] or by [`Settings::discover`] with precedence
//! CLI > `relkit.toml` > built-in defaults, and then passed by reference.

pub mod config;
pub mod error;

pub use config::{
    ConfigSource, MessageCallback, Settings, SettingsBuilder, SettingsFile, SettingsOverrides,
};
pub use error::ConfigError;
