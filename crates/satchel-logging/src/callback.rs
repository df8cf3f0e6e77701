//! Host log callback sink

use crate::logger::LogRecord;
use parking_lot::RwLock;

/// FFI callback function type for logging
///
/// # Parameters
/// - `level`: Log level (0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error)
/// - `scope`: Scope label, null-terminated C string
/// - `message`: Log message, pointer to UTF-8 bytes
/// - `message_len`: Length of the message in bytes
///
/// # Safety
/// The callback is invoked from Rust code. The `scope` string is null-terminated.
/// The `message` pointer is valid for `message_len` bytes during the callback only.
pub type LogCallback = extern "C" fn(
    level: u8,
    scope: *const std::ffi::c_char,
    message: *const u8,
    message_len: usize,
);

/// Sink that forwards raw events to a host-registered callback
///
/// Unlike the console and file sinks, the callback receives the unformatted
/// message, markup tags removed, so the host can apply its own formatting.
pub struct CallbackSink {
    callback: RwLock<Option<LogCallback>>,
}

impl CallbackSink {
    pub fn new() -> Self {
        Self {
            callback: RwLock::new(None),
        }
    }

    /// Set or clear the callback
    pub fn set_callback(&self, callback: Option<LogCallback>) {
        *self.callback.write() = callback;
    }

    pub fn get_callback(&self) -> Option<LogCallback> {
        *self.callback.read()
    }

    /// Invoke the callback, if one is registered
    pub fn emit(&self, record: &LogRecord<'_>) {
        let Some(callback) = self.get_callback() else {
            return;
        };

        // Interior NULs cannot cross as a C string; fall back to an empty scope
        let scope = std::ffi::CString::new(record.scope).unwrap_or_default();

        callback(
            record.level as u8,
            scope.as_ptr(),
            record.message.as_ptr(),
            record.message.len(),
        );
    }
}

impl Default for CallbackSink {
    fn default() -> Self {
        Self::new()
    }
}
