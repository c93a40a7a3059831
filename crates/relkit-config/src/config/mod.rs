//! Settings model, programmatic builder and file discovery
//!
//! Precedence: CLI overrides > `relkit.toml` > built-in defaults. Callbacks can
//! only be supplied programmatically.

mod builder;
mod discovery;
mod model;

pub use builder::SettingsBuilder;
pub use discovery::{CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use model::*;
