//! satchel-ffi - C ABI for the satchel packaging engine
//!
//! This crate provides the FFI boundary layer:
//! - [`SatchelContext`] bundling configuration, logger, and last-error state
//! - [`ContextRegistry`] mapping opaque host handles to live contexts
//! - [`ErrorState`] holding the message of the last failed operation
//! - C ABI exported functions (`satchel_*`)
//!
//! # FFI Functions
//!
//! The following functions are exported with C linkage:
//!
//! - `satchel_context_new` / `satchel_context_new_from_file` - Create a context
//! - `satchel_context_free` - Release a context
//! - `satchel_set_app_name` - Set the application label
//! - `satchel_log` / `satchel_log_preset` - Emit log events
//! - `satchel_set_log_level` / `satchel_set_log_callback` - Adjust logging at runtime
//! - `satchel_pack` / `satchel_unpack` - Convert between a tree and an archive
//! - `satchel_install` / `satchel_install_to` - Install an archive
//! - `satchel_get_last_error` / `satchel_last_error_len` / `satchel_clear_error` - Inspect failures
//!
//! The C declarations live in `include/satchel.h`.

mod buffer;
mod context;
mod error_state;
mod exports;
mod handle;
mod panic_guard;

pub use context::SatchelContext;
pub use error_state::ErrorState;
pub use handle::{ContextRegistry, SatchelHandle};

pub use exports::{
    satchel_clear_error, satchel_context_free, satchel_context_new,
    satchel_context_new_from_file, satchel_get_last_error, satchel_install, satchel_install_to,
    satchel_last_error_len, satchel_log, satchel_log_preset, satchel_pack, satchel_set_app_name,
    satchel_set_log_callback, satchel_set_log_level, satchel_unpack,
};

// Re-export types needed by Rust hosts
pub use satchel_core::{Config, LogLevel, SatchelError, SatchelResult};
pub use satchel_logging::LogCallback;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ContextRegistry, ErrorState, SatchelContext, SatchelHandle};
    pub use satchel_archive::prelude::*;
    pub use satchel_core::prelude::*;
    pub use satchel_logging::prelude::*;
}
