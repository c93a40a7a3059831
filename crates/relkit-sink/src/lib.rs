//! Line sink for relkit
//!
//! A [`LineSink`] accepts text one line at a time and tees every line to the
//! console, optionally to an append-only log file, and accumulates a batch that
//! is handed to a callback once a configured number of lines has arrived.
//!
//! The sink is an explicit stateful struct rather than a background consumer:
//! callers drive it with [`LineSink::send`] from whatever loop produces lines.

pub mod error;
pub mod sink;

pub use error::{SinkError, SinkInitError};
pub use sink::{BatchCallback, LineSink};
