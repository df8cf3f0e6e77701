//! Borrowing host memory: C string arguments and caller-owned output buffers

use satchel_core::{SatchelError, SatchelResult};
use std::borrow::Cow;
use std::ffi::{CStr, c_char};
use std::path::Path;

/// Borrow a required NUL-terminated UTF-8 argument
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub unsafe fn c_str_arg<'a>(ptr: *const c_char, name: &str) -> SatchelResult<&'a str> {
    if ptr.is_null() {
        return Err(SatchelError::InvalidArgument(format!("{name} is null")));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| SatchelError::InvalidArgument(format!("{name} is not valid UTF-8")))
}

/// Borrow an optional argument; null means absent
///
/// # Safety
/// Same as [`c_str_arg`].
pub unsafe fn optional_c_str_arg<'a>(
    ptr: *const c_char,
    name: &str,
) -> SatchelResult<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { c_str_arg(ptr, name) }.map(Some)
}

/// Borrow free-form text, replacing invalid UTF-8; null yields `None`
///
/// # Safety
/// Same as [`c_str_arg`].
pub unsafe fn lossy_c_str_arg<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

/// Borrow a required path argument
///
/// # Safety
/// Same as [`c_str_arg`].
pub unsafe fn path_arg<'a>(ptr: *const c_char, name: &str) -> SatchelResult<&'a Path> {
    let value = unsafe { c_str_arg(ptr, name) }?;
    if value.is_empty() {
        return Err(SatchelError::InvalidArgument(format!("{name} is empty")));
    }
    Ok(Path::new(value))
}

/// View a caller-owned output buffer as a byte slice
///
/// Returns `None` for a null buffer or zero capacity.
///
/// # Safety
/// `ptr` must be null or valid for writes of `capacity` bytes for `'a`.
pub unsafe fn out_buffer<'a>(ptr: *mut c_char, capacity: usize) -> Option<&'a mut [u8]> {
    if ptr.is_null() || capacity == 0 {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts_mut(ptr.cast::<u8>(), capacity) })
}

#[cfg(test)]
#[path = "buffer/buffer_tests.rs"]
mod buffer_tests;
