//! satchel-logging - Leveled, preset-driven logging
//!
//! This crate provides:
//! - [`Logger`] which formats events and routes them to every enabled sink
//! - [`LineFormat`] which renders level tags and `<bold>...</bold>` style
//!   message markup
//! - [`LogCallback`] type for forwarding events to a host-language callback
//! - [`init_diagnostics`] for the library's own `tracing` output
//!
//! Logging is best-effort: a sink that fails to write is counted and
//! reported through `tracing`, never returned to the caller.

mod callback;
mod diagnostics;
mod logger;
mod markup;
mod sink;

pub use callback::{CallbackSink, LogCallback};
pub use diagnostics::{DIAGNOSTICS_ENV_VAR, init_diagnostics};
pub use logger::{LogRecord, Logger};
pub use satchel_core::LogLevel;
pub use sink::{ConsoleSink, FileSink, LineFormat};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogCallback, LogLevel, LogRecord, Logger, init_diagnostics};
}
