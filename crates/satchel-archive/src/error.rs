//! Error types for archive operations.

use satchel_core::SatchelError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while packing, reading, extracting, or installing.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Pack root or archive file is missing or of the wrong type.
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Structural problem in the archive bytes.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Archive was written by a format version this build does not read.
    #[error("Unsupported archive version {0}")]
    UnsupportedVersion(u16),

    /// The archive ended before the declared data was read.
    #[error("Archive is truncated")]
    Truncated,

    /// Trailer digest does not match the archive contents.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// An entry path or link target would escape the extraction root.
    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),

    /// Decoded bytes or entry count exceed the configured budget.
    #[error("Size limit exceeded: {0}")]
    SizeLimitExceeded(String),

    /// A file name in the source tree cannot be stored as UTF-8.
    #[error("Path cannot be encoded in an archive: {}", .0.display())]
    UnencodablePath(PathBuf),

    /// Extraction target exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Install destination is not empty and overwrite was not requested.
    #[error("Destination is not empty: {}", .0.display())]
    DestinationExists(PathBuf),

    /// No install root is configured and none could be derived.
    #[error("No install root available")]
    NoInstallRoot,

    /// Install destination could not be derived from the inputs.
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ArchiveError> for SatchelError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::SourceNotFound(path) => {
                SatchelError::SourceNotFound(path.display().to_string())
            }
            ArchiveError::InvalidArchive(msg) => SatchelError::InvalidArchive(msg),
            ArchiveError::UnsupportedVersion(version) => {
                SatchelError::InvalidArchive(format!("unsupported format version {version}"))
            }
            ArchiveError::Truncated => {
                SatchelError::InvalidArchive("archive is truncated".to_string())
            }
            ArchiveError::ChecksumMismatch { expected, actual } => SatchelError::InvalidArchive(
                format!("checksum mismatch: expected {expected}, got {actual}"),
            ),
            ArchiveError::PathTraversal(msg) => SatchelError::PathTraversal(msg),
            ArchiveError::SizeLimitExceeded(msg) => SatchelError::SizeLimitExceeded(msg),
            ArchiveError::UnencodablePath(path) => SatchelError::Io(format!(
                "path cannot be encoded in an archive: {}",
                path.display()
            )),
            ArchiveError::NotADirectory(path) => {
                SatchelError::Io(format!("not a directory: {}", path.display()))
            }
            ArchiveError::DestinationExists(path) => {
                SatchelError::DestinationExists(path.display().to_string())
            }
            ArchiveError::NoInstallRoot => SatchelError::Config(
                "no install root configured and no default data directory".to_string(),
            ),
            ArchiveError::InvalidDestination(msg) => SatchelError::InvalidArgument(msg),
            ArchiveError::Io(e) => SatchelError::Io(e.to_string()),
        }
    }
}
