//! Configuration resolution
//!
//! Settings are read once from a TOML file, validated, and resolved into an
//! immutable [`Config`]. A missing file is not an error: built-in defaults
//! apply instead.

use crate::preset::{PresetTable, RawPreset};
use crate::style::{Palette, Rgb, TagAlign, TagStyle, TagTransform};
use crate::template::LineTemplate;
use crate::{ConfigError, LogLevel};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const CONFIG_ENV_VAR: &str = "SATCHEL_CONFIG";

/// Settings file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "satchel.toml";

/// Application label used when neither the settings file nor the host sets one
pub const DEFAULT_APP_NAME: &str = "satchel";

const DEFAULT_CONSOLE_FORMAT: &str = "{tag} {scope} {msg}";
const DEFAULT_FILE_FORMAT: &str = "{timestamp} {tag} [{app}] {scope}: {msg}";
const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_EXTENSION: &str = "satchel";
const DEFAULT_MAX_UNPACKED_BYTES: u64 = 1024 * 1024 * 1024;
const DEFAULT_MAX_ENTRIES: u64 = 100_000;
const MAX_TAG_WIDTH: usize = 32;

/// When the console sink emits ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when stdout is a terminal and `NO_COLOR` is unset
    #[default]
    Auto,
    Always,
    Never,
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level that reaches the sinks
    pub level: LogLevel,
    pub console: bool,
    pub file: bool,
    /// Log file location; always `Some` when `file` is enabled
    pub file_path: Option<PathBuf>,
    pub color: ColorMode,
    pub console_format: LineTemplate,
    pub file_format: LineTemplate,
    /// `strftime`-style format for `{timestamp}`
    pub timestamp_format: String,
    /// Rendering of the `{tag}` placeholder
    pub tag: TagStyle,
    /// Tag colors and markup colors for the console
    pub colors: Palette,
}

/// Resolved archive settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Archive file extension, without the leading dot
    pub extension: String,
    /// Upper bound on decoded content bytes per unpack
    pub max_unpacked_bytes: u64,
    /// Upper bound on entries per unpack
    pub max_entries: u64,
}

/// Resolved installer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Base directory for default install destinations
    pub root: Option<PathBuf>,
    /// Whether `install` replaces a non-empty destination
    pub overwrite: bool,
}

/// Immutable, fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_name: String,
    pub logging: LoggingConfig,
    pub archive: ArchiveConfig,
    pub install: InstallConfig,
    pub presets: PresetTable,
}

/// In-memory overrides applied on top of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub app_name: Option<String>,
    pub log_level: Option<LogLevel>,
}

impl Config {
    /// Load from the well-known settings source
    ///
    /// `$SATCHEL_CONFIG` wins when set; otherwise
    /// `<config dir>/satchel/satchel.toml` is used.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&ConfigOverrides::default())
    }

    /// Load from the well-known settings source, then apply `overrides`
    pub fn load_with(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from_with(&path, overrides),
            None => {
                tracing::debug!("No config directory on this platform, using defaults");
                resolve(RawConfig::default(), overrides)
            }
        }
    }

    /// Load from an explicit settings file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_from_with(path, &ConfigOverrides::default())
    }

    /// Load from an explicit settings file, then apply `overrides`
    pub fn load_from_with<P: AsRef<Path>>(
        path: P,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(text) => parse(&text, &path.display().to_string())?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                RawConfig::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        resolve(raw, overrides)
    }

    /// Parse a settings document held in memory
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        resolve(parse(text, "inline config")?, &ConfigOverrides::default())
    }

    /// Path of the well-known settings file, if one can be determined
    pub fn default_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|dir| dir.join(DEFAULT_APP_NAME).join(CONFIG_FILE_NAME))
    }
}

impl Default for Config {
    #[allow(clippy::expect_used)] // Safe: built-in defaults are covered by tests
    fn default() -> Self {
        resolve(RawConfig::default(), &ConfigOverrides::default())
            .expect("built-in configuration must resolve")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    app_name: Option<String>,
    logging: RawLogging,
    archive: RawArchive,
    install: RawInstall,
    presets: BTreeMap<String, RawPreset>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLogging {
    level: String,
    console: bool,
    file: bool,
    file_path: Option<String>,
    color: ColorMode,
    console_format: String,
    file_format: String,
    timestamp_format: String,
    tag: RawTag,
    colors: BTreeMap<String, String>,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file: false,
            file_path: None,
            color: ColorMode::Auto,
            console_format: DEFAULT_CONSOLE_FORMAT.to_string(),
            file_format: DEFAULT_FILE_FORMAT.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            tag: RawTag::default(),
            colors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawTag {
    prefix: String,
    suffix: String,
    transform: TagTransform,
    min_width: usize,
    align: TagAlign,
    labels: BTreeMap<String, String>,
}

impl Default for RawTag {
    fn default() -> Self {
        let style = TagStyle::default();
        Self {
            prefix: style.prefix,
            suffix: style.suffix,
            transform: style.transform,
            min_width: style.min_width,
            align: style.align,
            labels: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawArchive {
    extension: String,
    max_unpacked_bytes: u64,
    max_entries: u64,
}

impl Default for RawArchive {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            max_unpacked_bytes: DEFAULT_MAX_UNPACKED_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawInstall {
    root: Option<String>,
    overwrite: bool,
}

fn parse(text: &str, origin: &str) -> Result<RawConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn resolve(raw: RawConfig, overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    let app_name = overrides
        .app_name
        .clone()
        .or(raw.app_name)
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
    if app_name.trim().is_empty() {
        return Err(ConfigError::invalid("app_name", "must not be empty"));
    }

    let logging = resolve_logging(raw.logging, &app_name, overrides.log_level)?;
    let archive = resolve_archive(raw.archive)?;
    let install = InstallConfig {
        root: match raw.install.root {
            Some(root) if !root.is_empty() => Some(expand_home(&root)),
            _ => dirs::data_dir().map(|dir| dir.join(DEFAULT_APP_NAME)),
        },
        overwrite: raw.install.overwrite,
    };

    let mut presets = PresetTable::builtin()?;
    presets.merge_raw(raw.presets)?;

    Ok(Config {
        app_name,
        logging,
        archive,
        install,
        presets,
    })
}

fn resolve_logging(
    raw: RawLogging,
    app_name: &str,
    level_override: Option<LogLevel>,
) -> Result<LoggingConfig, ConfigError> {
    let level = match level_override {
        Some(level) => level,
        None => raw
            .level
            .parse()
            .map_err(|reason: String| ConfigError::invalid("logging.level", reason))?,
    };

    let console_format = LineTemplate::parse(&raw.console_format)
        .map_err(|reason| ConfigError::invalid("logging.console_format", reason))?;
    let file_format = LineTemplate::parse(&raw.file_format)
        .map_err(|reason| ConfigError::invalid("logging.file_format", reason))?;

    if StrftimeItems::new(&raw.timestamp_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::invalid(
            "logging.timestamp_format",
            format!("`{}` is not a valid strftime format", raw.timestamp_format),
        ));
    }

    let file_path = match raw.file_path {
        Some(path) if !path.is_empty() => Some(expand_home(&path)),
        _ if raw.file => Some(default_log_path(app_name).ok_or_else(|| {
            ConfigError::invalid(
                "logging.file_path",
                "file sink enabled but no default log directory exists on this platform",
            )
        })?),
        _ => None,
    };

    Ok(LoggingConfig {
        level,
        console: raw.console,
        file: raw.file,
        file_path,
        color: raw.color,
        console_format,
        file_format,
        timestamp_format: raw.timestamp_format,
        tag: resolve_tag(raw.tag)?,
        colors: resolve_colors(raw.colors)?,
    })
}

fn resolve_tag(raw: RawTag) -> Result<TagStyle, ConfigError> {
    if raw.min_width > MAX_TAG_WIDTH {
        return Err(ConfigError::invalid(
            "logging.tag.min_width",
            format!("must be at most {MAX_TAG_WIDTH}"),
        ));
    }
    for (key, value) in [("prefix", &raw.prefix), ("suffix", &raw.suffix)] {
        if value.contains(['\n', '\r']) {
            return Err(ConfigError::invalid(
                format!("logging.tag.{key}"),
                "must not contain a line break",
            ));
        }
    }

    let mut labels = BTreeMap::new();
    for (name, label) in raw.labels {
        let level = match name.parse::<LogLevel>() {
            Ok(LogLevel::Off) | Err(_) => {
                return Err(ConfigError::invalid(
                    format!("logging.tag.labels.{name}"),
                    "labels are keyed by trace, debug, info, warn, or error",
                ));
            }
            Ok(level) => level,
        };
        if label.contains(['\n', '\r']) {
            return Err(ConfigError::invalid(
                format!("logging.tag.labels.{name}"),
                "must not contain a line break",
            ));
        }
        labels.insert(level, label);
    }

    Ok(TagStyle {
        prefix: raw.prefix,
        suffix: raw.suffix,
        transform: raw.transform,
        min_width: raw.min_width,
        align: raw.align,
        labels,
    })
}

fn resolve_colors(raw: BTreeMap<String, String>) -> Result<Palette, ConfigError> {
    let mut palette = Palette::new();
    for (name, value) in raw {
        let color = value
            .parse::<Rgb>()
            .map_err(|reason| ConfigError::invalid(format!("logging.colors.{name}"), reason))?;
        palette.insert(name, color);
    }
    Ok(palette)
}

fn resolve_archive(raw: RawArchive) -> Result<ArchiveConfig, ConfigError> {
    let extension = raw.extension.trim_start_matches('.').to_string();
    if extension.is_empty() || extension.contains(['/', '\\']) {
        return Err(ConfigError::invalid(
            "archive.extension",
            format!("`{}` is not a usable file extension", raw.extension),
        ));
    }
    if raw.max_unpacked_bytes == 0 {
        return Err(ConfigError::invalid(
            "archive.max_unpacked_bytes",
            "must be greater than zero",
        ));
    }
    if raw.max_entries == 0 {
        return Err(ConfigError::invalid("archive.max_entries", "must be greater than zero"));
    }

    Ok(ArchiveConfig {
        extension,
        max_unpacked_bytes: raw.max_unpacked_bytes,
        max_entries: raw.max_entries,
    })
}

fn default_log_path(app_name: &str) -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(DEFAULT_APP_NAME).join(format!("{app_name}.log")))
}

/// Expand a leading `~` to the user's home directory
fn expand_home(value: &str) -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        if value == "~" {
            return home;
        }
        if let Some(rest) = value.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
