//! Interactive prompts for relkit
//!
//! [`menu`] lets the operator pick one of several options. It pipes the
//! options through `fzf` when that is on `PATH` and otherwise draws a
//! numbered tree menu and reads the choice key by key.

pub mod keys;
pub mod menu;

pub use keys::{Key, KeySource, ScriptedKeys, TerminalKeys};
pub use menu::{MenuOptions, fzf_select, menu, numbered_menu};
