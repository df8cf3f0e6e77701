//! C ABI exported functions
//!
//! Every function resolves its handle through the [`ContextRegistry`] and
//! runs under a panic guard. Fallible operations return `0` on success and
//! the [`SatchelError`] code otherwise; the message is kept in the
//! context's error state until the next fallible call.

use crate::buffer::{c_str_arg, lossy_c_str_arg, optional_c_str_arg, out_buffer, path_arg};
use crate::context::SatchelContext;
use crate::handle::{ContextRegistry, SatchelHandle, handle_to_id, id_to_handle};
use crate::panic_guard::{catch_panic, catch_panic_in};
use satchel_core::{LogLevel, SatchelError, SatchelResult};
use satchel_logging::{LogCallback, init_diagnostics};
use std::ffi::{c_char, c_int};
use std::panic::{AssertUnwindSafe, UnwindSafe};
use std::path::Path;
use std::ptr;

/// Status code for `error`
fn status(error: &SatchelError) -> c_int {
    error.error_code() as c_int
}

fn lookup(handle: SatchelHandle) -> Option<std::sync::Arc<SatchelContext>> {
    if handle.is_null() {
        return None;
    }
    ContextRegistry::global().get(handle_to_id(handle))
}

/// Run a fallible operation against the context behind `handle`
///
/// Errors raised by `f` before it reaches the context (bad arguments) are
/// recorded here; the context records its own.
fn with_status<F>(handle: SatchelHandle, f: F) -> c_int
where
    F: FnOnce(&SatchelContext) -> SatchelResult<()>,
{
    let Some(ctx) = lookup(handle) else {
        tracing::debug!("Call on unknown or freed context handle");
        return status(&SatchelError::InvalidHandle);
    };

    match catch_panic_in(&ctx, AssertUnwindSafe(|| f(&ctx))) {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            ctx.errors().set(e.to_string());
            status(&e)
        }
        Err(e) => status(&e),
    }
}

/// Run an infallible operation against the context behind `handle`
///
/// Unknown handles are ignored.
fn with_context<F>(handle: SatchelHandle, f: F)
where
    F: FnOnce(&SatchelContext),
{
    match lookup(handle) {
        Some(ctx) => {
            let _ = catch_panic_in(&ctx, AssertUnwindSafe(|| f(&ctx)));
        }
        None => tracing::debug!("Call on unknown or freed context handle ignored"),
    }
}

fn register_context<F>(create: F) -> SatchelHandle
where
    F: FnOnce() -> SatchelResult<SatchelContext> + UnwindSafe,
{
    match catch_panic(create) {
        Ok(Ok(ctx)) => id_to_handle(ContextRegistry::global().register(ctx)),
        Ok(Err(e)) => {
            tracing::error!(code = e.error_code(), "Context creation failed: {}", e);
            ptr::null_mut()
        }
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a context from the well-known settings source
///
/// # Returns
/// A handle, or null if the settings could not be loaded
#[unsafe(no_mangle)]
pub extern "C" fn satchel_context_new() -> SatchelHandle {
    init_diagnostics();
    register_context(SatchelContext::new)
}

/// Create a context from an explicit settings file
///
/// A missing file yields built-in defaults; an unreadable or invalid one
/// yields null.
///
/// # Safety
/// `config_path` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_context_new_from_file(config_path: *const c_char) -> SatchelHandle {
    init_diagnostics();
    let path = match unsafe { path_arg(config_path, "config_path") } {
        Ok(path) => path.to_path_buf(),
        Err(e) => {
            tracing::error!("Context creation failed: {}", e);
            return ptr::null_mut();
        }
    };
    register_context(move || SatchelContext::from_file(&path))
}

/// Release a context
///
/// Null and unknown handles are ignored, so a double free is harmless. A
/// call still running on another thread keeps the context alive until it
/// returns.
///
/// # Safety
/// `handle` must be null or a value returned by a `satchel_context_new*`
/// function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_context_free(handle: SatchelHandle) {
    if handle.is_null() {
        return;
    }
    let id = handle_to_id(handle);
    let removed = catch_panic(|| ContextRegistry::global().remove(id).map(drop).is_some());
    if !matches!(removed, Ok(true)) {
        tracing::debug!(id, "Free of unknown context handle ignored");
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Set the application label used in log lines and default install paths
///
/// # Safety
/// `name` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_set_app_name(handle: SatchelHandle, name: *const c_char) {
    with_context(handle, |ctx| match unsafe { c_str_arg(name, "name") } {
        Ok(name) => ctx.set_app_name(name),
        Err(e) => ctx.fail(&e),
    });
}

/// Log a free-form message
///
/// A null or unrecognized `level` logs at info, a null `scope` is empty, and
/// a null `msg` is ignored. Never touches the error state.
///
/// # Safety
/// Each string must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_log(
    handle: SatchelHandle,
    level: *const c_char,
    scope: *const c_char,
    msg: *const c_char,
) {
    with_context(handle, |ctx| {
        let Some(msg) = (unsafe { lossy_c_str_arg(msg) }) else {
            tracing::debug!("satchel_log called with null message");
            return;
        };
        let level = unsafe { lossy_c_str_arg(level) };
        let scope = unsafe { lossy_c_str_arg(scope) };
        ctx.log(
            level.as_deref().unwrap_or("info"),
            scope.as_deref().unwrap_or(""),
            &msg,
        );
    });
}

/// Log a named preset; a non-empty `override_or_null` replaces its message
///
/// # Safety
/// `preset` must be a valid NUL-terminated string; `override_or_null` must
/// be null or one.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_log_preset(
    handle: SatchelHandle,
    preset: *const c_char,
    override_or_null: *const c_char,
) -> c_int {
    with_status(handle, |ctx| {
        let name = unsafe { c_str_arg(preset, "preset") }?;
        let override_message = unsafe { optional_c_str_arg(override_or_null, "override") }?;
        ctx.log_preset(name, override_message)
    })
}

/// Change the minimum level at runtime
///
/// `0`=trace, `1`=debug, `2`=info, `3`=warn, `4`=error, anything else off.
///
/// # Safety
/// `handle` must be null or a value returned by a `satchel_context_new*`
/// function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_set_log_level(handle: SatchelHandle, level: u8) {
    with_context(handle, |ctx| ctx.set_log_level(LogLevel::from_u8(level)));
}

/// Register a host callback receiving every emitted event; null unregisters
///
/// # Safety
/// The callback must stay callable until it is replaced or the context is
/// freed, and must tolerate calls from any thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_set_log_callback(
    handle: SatchelHandle,
    callback: Option<LogCallback>,
) {
    with_context(handle, |ctx| ctx.set_log_callback(callback));
}

// ============================================================================
// Packaging
// ============================================================================

/// Pack the tree under `source_dir` into `output_file`
///
/// # Safety
/// Both strings must be valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_pack(
    handle: SatchelHandle,
    source_dir: *const c_char,
    output_file: *const c_char,
) -> c_int {
    with_status(handle, |ctx| {
        let source = unsafe { path_arg(source_dir, "source_dir") }?;
        let output = unsafe { path_arg(output_file, "output_file") }?;
        ctx.pack(source, output).map(drop)
    })
}

/// Unpack `archive_file` into `target_dir`
///
/// # Safety
/// Both strings must be valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_unpack(
    handle: SatchelHandle,
    archive_file: *const c_char,
    target_dir: *const c_char,
) -> c_int {
    with_status(handle, |ctx| {
        let archive = unsafe { path_arg(archive_file, "archive_file") }?;
        let target = unsafe { path_arg(target_dir, "target_dir") }?;
        ctx.unpack(archive, target).map(drop)
    })
}

/// Install `archive_file` at its default destination with the configured
/// overwrite policy
///
/// # Safety
/// `archive_file` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_install(
    handle: SatchelHandle,
    archive_file: *const c_char,
) -> c_int {
    with_status(handle, |ctx| {
        let archive = unsafe { path_arg(archive_file, "archive_file") }?;
        ctx.install(archive).map(drop)
    })
}

/// Install `archive_file` at `destination_or_null` (or the default
/// destination) with an explicit overwrite policy
///
/// # Safety
/// `archive_file` must be a valid NUL-terminated string;
/// `destination_or_null` must be null or one.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_install_to(
    handle: SatchelHandle,
    archive_file: *const c_char,
    destination_or_null: *const c_char,
    overwrite: bool,
) -> c_int {
    with_status(handle, |ctx| {
        let archive = unsafe { path_arg(archive_file, "archive_file") }?;
        let destination = unsafe { optional_c_str_arg(destination_or_null, "destination") }?
            .filter(|d| !d.is_empty())
            .map(Path::new);
        ctx.install_to(archive, destination, overwrite).map(drop)
    })
}

// ============================================================================
// Error state
// ============================================================================

/// Copy the last error message into `buffer`
///
/// # Returns
/// Bytes written excluding the NUL terminator, or `-1` if no error is
/// pending, the handle is unknown, or the message plus terminator does not
/// fit in `capacity`. Nothing is written on `-1`.
///
/// # Safety
/// `buffer` must be null or valid for writes of `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_get_last_error(
    handle: SatchelHandle,
    buffer: *mut c_char,
    capacity: usize,
) -> c_int {
    let Some(ctx) = lookup(handle) else {
        return -1;
    };
    catch_panic(AssertUnwindSafe(|| match unsafe { out_buffer(buffer, capacity) } {
        Some(buffer) => ctx.copy_last_error(buffer),
        None => -1,
    }))
    .unwrap_or(-1)
}

/// Buffer capacity needed for the last error message, including the NUL
/// terminator; `0` when no error is pending or the handle is unknown
///
/// # Safety
/// `handle` must be null or a value returned by a `satchel_context_new*`
/// function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_last_error_len(handle: SatchelHandle) -> usize {
    lookup(handle).map_or(0, |ctx| ctx.last_error_len())
}

/// Discard the pending error message
///
/// # Safety
/// `handle` must be null or a value returned by a `satchel_context_new*`
/// function.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn satchel_clear_error(handle: SatchelHandle) {
    with_context(handle, SatchelContext::clear_error);
}
