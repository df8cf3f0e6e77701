//! Leveled logger that fans events out to its sinks

use crate::callback::{CallbackSink, LogCallback};
use crate::markup;
use crate::sink::{ConsoleSink, FileSink, LineFormat};
use chrono::{DateTime, Local};
use satchel_core::{LogLevel, LoggingConfig, PresetTable, SatchelError};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

/// One log event, borrowed for the duration of the emit
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub app: &'a str,
    pub scope: &'a str,
    pub message: &'a str,
}

/// Leveled logger with console, file, and callback sinks
///
/// All methods take `&self`; the logger is shared across threads by the
/// context that owns it. Sink failures never reach the caller: they bump
/// [`Logger::dropped_writes`] and are reported as diagnostics.
pub struct Logger {
    level: AtomicU8,
    console: Option<ConsoleSink>,
    file: Option<FileSink>,
    callback: CallbackSink,
    dropped_writes: AtomicU64,
}

impl Logger {
    /// Build a logger from resolved settings
    pub fn new(config: &LoggingConfig) -> Self {
        let console = config.console.then(|| {
            ConsoleSink::new(
                LineFormat::from_config(&config.console_format, config),
                config.color,
            )
        });

        let file = match (&config.file_path, config.file) {
            (Some(path), true) => Some(FileSink::new(
                path,
                LineFormat::from_config(&config.file_format, config),
            )),
            _ => None,
        };

        Self {
            level: AtomicU8::new(config.level as u8),
            console,
            file,
            callback: CallbackSink::new(),
            dropped_writes: AtomicU64::new(0),
        }
    }

    /// Get the current minimum level
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// Set the minimum level; takes effect for subsequent events
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Check if an event at `level` would reach the sinks
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Register or clear the host callback
    pub fn set_callback(&self, callback: Option<LogCallback>) {
        self.callback.set_callback(callback);
    }

    /// Number of sink writes that failed since creation
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes.load(Ordering::Relaxed)
    }

    /// Location of the file sink, if enabled
    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().map(FileSink::path)
    }

    /// Emit one event to every enabled sink
    ///
    /// `message` may carry inline markup such as `<bold>...</bold>`; only a
    /// colorizing console shows it, every other sink gets the bare text.
    /// Returns whether the event passed the level filter.
    pub fn log(&self, app: &str, level: LogLevel, scope: &str, message: &str) -> bool {
        if !self.is_enabled(level) {
            return false;
        }

        let record = LogRecord {
            timestamp: Local::now(),
            level,
            app,
            scope,
            message,
        };

        if let Some(console) = &self.console
            && let Err(e) = console.write(&record)
        {
            self.record_failure("console", &e);
        }
        if let Some(file) = &self.file
            && let Err(e) = file.write(&record)
        {
            self.record_failure("file", &e);
        }
        self.callback.emit(&LogRecord {
            message: &markup::strip(message),
            ..record
        });

        true
    }

    /// Emit the named preset, optionally replacing its message
    ///
    /// Fails only when `name` is not in `presets`.
    pub fn log_preset(
        &self,
        app: &str,
        presets: &PresetTable,
        name: &str,
        override_message: Option<&str>,
    ) -> Result<bool, SatchelError> {
        let preset = presets.resolve(name, override_message)?;
        Ok(self.log(app, preset.level, preset.scope, preset.message))
    }

    /// Flush the file sink
    pub fn flush(&self) {
        if let Some(file) = &self.file
            && let Err(e) = file.flush()
        {
            self.record_failure("file", &e);
        }
    }

    fn record_failure(&self, sink: &'static str, error: &io::Error) {
        self.dropped_writes.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(sink, error = %error, "Log sink write failed");
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
#[path = "logger/logger_tests.rs"]
mod logger_tests;
