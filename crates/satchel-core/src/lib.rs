//! satchel-core - Core types, error taxonomy, and configuration
//!
//! This crate provides the foundational types shared by every satchel crate:
//! - [`LogLevel`] for leveled logging and filtering
//! - [`SatchelError`] for the flat error taxonomy reported to hosts
//! - [`Config`] for resolved, immutable settings
//! - [`PresetTable`] for named log shortcuts
//! - [`TagStyle`] and [`Palette`] for level tags and colors

mod config;
mod error;
mod preset;
mod style;
mod template;

pub use config::{
    ArchiveConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME, ColorMode, Config, ConfigOverrides,
    DEFAULT_APP_NAME, InstallConfig, LoggingConfig,
};
pub use error::{ConfigError, SatchelError, SatchelResult};
pub use preset::{Preset, PresetTable, ResolvedPreset};
pub use style::{Palette, Rgb, TagAlign, TagStyle, TagTransform};
pub use template::{LineTemplate, Placeholder, Segment};

/// Log levels, ordered from most to least verbose
///
/// `Off` is only meaningful as a filter value; events are never emitted at it.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }

    /// Lower-case name, as accepted in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level `{other}`")),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ColorMode, Config, ConfigError, ConfigOverrides, LogLevel, Preset, PresetTable,
        SatchelError, SatchelResult,
    };
}
