//! satchel-archive - Checksummed directory archives
//!
//! This crate provides:
//! - [`pack`] to serialize a directory tree into a single archive file
//! - [`unpack`] to restore it, rejecting anything that escapes the target
//! - [`ArchiveReader`] and [`list`] for inspecting archives without extracting
//! - [`Installer`] for unpacking into a per-application install root
//!
//! # Example
//!
//! ```no_run
//! use satchel_archive::{Limits, PackOptions, pack, unpack};
//! use std::path::Path;
//!
//! pack(Path::new("assets"), Path::new("assets.satchel"), &PackOptions::default())?;
//! unpack(Path::new("assets.satchel"), Path::new("restored"), &Limits::default())?;
//! # Ok::<(), satchel_archive::ArchiveError>(())
//! ```

mod error;
mod extract;
pub mod format;
mod install;
mod limits;
pub mod path;
mod reader;
mod writer;

pub use error::{ArchiveError, ArchiveResult};
pub use extract::{STAGING_PREFIX, UnpackSummary, unpack};
pub use format::{EntryInfo, EntryKind, FORMAT_VERSION, Header, MAGIC};
pub use install::{InstallOptions, InstallSummary, Installer};
pub use limits::Limits;
pub use reader::{ArchiveReader, list};
pub use writer::{PackOptions, PackSummary, pack};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArchiveError, ArchiveResult, InstallOptions, Installer, Limits, PackOptions, pack, unpack,
    };
}
