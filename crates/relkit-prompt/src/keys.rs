//! Single-key input

use std::collections::VecDeque;
use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// A key press as the menu sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    /// Ctrl-C, Esc or end of input
    Cancel,
}

/// Source of key presses
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<Key>;
}

/// Reads keys from the terminal in raw mode, one key at a time.
#[derive(Debug, Default)]
pub struct TerminalKeys;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Key> {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                return Ok(match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        Key::Cancel
                    }
                    KeyCode::Char(c) => Key::Char(c),
                    KeyCode::Enter => Key::Enter,
                    KeyCode::Esc => Key::Cancel,
                    _ => continue,
                });
            }
        }
    }
}

/// Replays a fixed key sequence, then reports [`Key::Cancel`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// One [`Key::Char`] per character, `\n` and `\r` as [`Key::Enter`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(text.chars().map(|c| match c {
            '\n' | '\r' => Key::Enter,
            c => Key::Char(c),
        }))
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> io::Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Cancel))
    }
}
