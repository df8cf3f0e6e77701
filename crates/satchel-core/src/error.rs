//! Error types for satchel operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for satchel operations
pub type SatchelResult<T> = Result<T, SatchelError>;

/// Flat error taxonomy reported across the C boundary
///
/// Each variant carries one human-readable message; there is no cause
/// chaining. The numeric code is also the non-zero status returned by the
/// exported functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SatchelError {
    /// Settings could not be read, parsed, or validated
    #[error("configuration error: {0}")]
    Config(String),

    /// A preset name that is not in the preset table
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// Pack root or archive file missing, or of the wrong type
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// Bad magic, unsupported version, or structural corruption
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// An entry would resolve outside the extraction root
    #[error("path traversal rejected: {0}")]
    PathTraversal(String),

    /// Decoded bytes or entries exceed the configured budget
    #[error("size limit exceeded: {0}")]
    SizeLimitExceeded(String),

    /// Generic read/write failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Context creation failed
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Install destination is not empty and overwrite was not requested
    #[error("destination is not empty: {0}")]
    DestinationExists(String),

    /// Null or malformed argument from the host
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Handle is unknown or already freed
    #[error("invalid handle")]
    InvalidHandle,

    /// A panic was caught at the boundary
    #[error("internal error: {0}")]
    Internal(String),
}

impl SatchelError {
    /// Returns an error code suitable for FFI
    pub fn error_code(&self) -> u32 {
        match self {
            SatchelError::Config(_) => 1,
            SatchelError::UnknownPreset(_) => 2,
            SatchelError::SourceNotFound(_) => 3,
            SatchelError::InvalidArchive(_) => 4,
            SatchelError::PathTraversal(_) => 5,
            SatchelError::SizeLimitExceeded(_) => 6,
            SatchelError::Io(_) => 7,
            SatchelError::AllocationFailure(_) => 8,
            SatchelError::DestinationExists(_) => 9,
            SatchelError::InvalidArgument(_) => 10,
            SatchelError::InvalidHandle => 11,
            SatchelError::Internal(_) => 12,
        }
    }

    /// Create an error from an error code and message
    pub fn from_code(code: u32, message: String) -> Self {
        match code {
            1 => SatchelError::Config(message),
            2 => SatchelError::UnknownPreset(message),
            3 => SatchelError::SourceNotFound(message),
            4 => SatchelError::InvalidArchive(message),
            5 => SatchelError::PathTraversal(message),
            6 => SatchelError::SizeLimitExceeded(message),
            7 => SatchelError::Io(message),
            8 => SatchelError::AllocationFailure(message),
            9 => SatchelError::DestinationExists(message),
            10 => SatchelError::InvalidArgument(message),
            11 => SatchelError::InvalidHandle,
            _ => SatchelError::Internal(message),
        }
    }
}

impl From<std::io::Error> for SatchelError {
    fn from(err: std::io::Error) -> Self {
        SatchelError::Io(err.to_string())
    }
}

impl From<ConfigError> for SatchelError {
    fn from(err: ConfigError) -> Self {
        SatchelError::Config(err.to_string())
    }
}

/// Errors raised while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax error, wrong type, or unknown key
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is out of range
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
