//! Per-context last-error slot

use parking_lot::Mutex;

/// Holds the message of the most recent failed operation
///
/// The slot is overwritten by every fallible operation: cleared on success,
/// replaced on failure. Reading never clears it.
#[derive(Debug, Default)]
pub struct ErrorState {
    slot: Mutex<Option<String>>,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending message
    ///
    /// Interior NUL bytes would truncate the message on the C side, so they
    /// are replaced with U+FFFD.
    pub fn set(&self, message: impl Into<String>) {
        let mut message = message.into();
        if message.contains('\0') {
            message = message.replace('\0', "\u{FFFD}");
        }
        *self.slot.lock() = Some(message);
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Copy of the pending message, if any
    pub fn message(&self) -> Option<String> {
        self.slot.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Buffer size needed for the pending message plus its NUL terminator
    ///
    /// Returns 0 when no error is pending.
    pub fn required_capacity(&self) -> usize {
        self.slot.lock().as_ref().map_or(0, |m| m.len() + 1)
    }

    /// Write the pending message and a NUL terminator into `buffer`
    ///
    /// Returns the number of message bytes written, excluding the
    /// terminator. Returns -1, leaving `buffer` untouched, when no error is
    /// pending or the whole message does not fit.
    pub fn copy_into(&self, buffer: &mut [u8]) -> i32 {
        let guard = self.slot.lock();
        let Some(message) = guard.as_deref() else {
            return -1;
        };

        let bytes = message.as_bytes();
        let Ok(written) = i32::try_from(bytes.len()) else {
            return -1;
        };
        if bytes.len() + 1 > buffer.len() {
            return -1;
        }

        buffer[..bytes.len()].copy_from_slice(bytes);
        buffer[bytes.len()] = 0;
        written
    }
}
