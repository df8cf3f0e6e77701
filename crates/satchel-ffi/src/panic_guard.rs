//! Panic handling for FFI boundaries
//!
//! Unwinding into a host runtime is undefined behavior, so every export runs
//! its body through [`catch_panic`] and turns a panic into
//! [`SatchelError::Internal`].

use crate::context::SatchelContext;
use satchel_core::SatchelError;
use std::any::Any;
use std::panic;

/// Run `f`, converting a panic into an `Internal` error
pub fn catch_panic<F, R>(f: F) -> Result<R, SatchelError>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    panic::catch_unwind(f).map_err(|payload| {
        let message = panic_to_string(payload.as_ref());
        tracing::error!("FFI panic caught: {}", message);
        SatchelError::Internal(message)
    })
}

/// Like [`catch_panic`], also recording a caught panic in `context`'s
/// error state
pub fn catch_panic_in<F, R>(context: &SatchelContext, f: F) -> Result<R, SatchelError>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    catch_panic(f).inspect_err(|e| context.fail(e))
}

/// Convert a panic payload to a human-readable string
fn panic_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked with unknown payload".to_string()
    }
}
