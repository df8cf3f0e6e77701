//! Named log presets

use crate::{ConfigError, LogLevel, SatchelError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Built-in preset table, embedded so defaults never depend on external files
const BUILTIN_PRESETS: &str = include_str!("defaults.toml");

/// A named shortcut expanding to a level and a default message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub level: LogLevel,
    /// Scope label; the preset name is used when absent
    pub scope: Option<String>,
    pub message: String,
}

impl Preset {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            scope: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// A preset resolved for one call, with any override applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPreset<'a> {
    pub level: LogLevel,
    pub scope: &'a str,
    pub message: &'a str,
}

/// Preset entry as written in TOML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawPreset {
    level: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(alias = "message")]
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPresetFile {
    presets: BTreeMap<String, RawPreset>,
}

/// Lookup table from preset name to [`Preset`]
///
/// Built once while configuration is resolved; lookups never re-parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetTable {
    presets: HashMap<String, Preset>,
}

impl PresetTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded default presets
    pub fn builtin() -> Result<Self, ConfigError> {
        let file: RawPresetFile =
            toml::from_str(BUILTIN_PRESETS).map_err(|source| ConfigError::Parse {
                origin: "built-in presets".to_string(),
                source,
            })?;

        let mut table = Self::new();
        table.merge_raw(file.presets)?;
        Ok(table)
    }

    /// Merge presets parsed from a settings file; later entries win by name
    pub(crate) fn merge_raw(
        &mut self,
        raw: BTreeMap<String, RawPreset>,
    ) -> Result<(), ConfigError> {
        for (name, entry) in raw {
            let key = format!("presets.{name}.level");
            let level: LogLevel = entry
                .level
                .parse()
                .map_err(|reason: String| ConfigError::invalid(&key, reason))?;
            if level == LogLevel::Off {
                return Err(ConfigError::invalid(key, "`off` is not an event level"));
            }
            if name.trim().is_empty() {
                return Err(ConfigError::invalid("presets", "preset names must not be empty"));
            }

            self.presets.insert(
                name,
                Preset {
                    level,
                    scope: entry.scope.filter(|s| !s.is_empty()),
                    message: entry.msg,
                },
            );
        }
        Ok(())
    }

    /// Insert or replace a preset
    pub fn insert(&mut self, name: impl Into<String>, preset: Preset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve `name` for one call
    ///
    /// A non-empty `override_message` replaces the preset's message; the
    /// preset's level always wins.
    pub fn resolve<'a>(
        &'a self,
        name: &'a str,
        override_message: Option<&'a str>,
    ) -> Result<ResolvedPreset<'a>, SatchelError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| SatchelError::UnknownPreset(name.to_string()))?;

        Ok(ResolvedPreset {
            level: preset.level,
            scope: preset.scope.as_deref().unwrap_or(name),
            message: override_message
                .filter(|m| !m.is_empty())
                .unwrap_or(preset.message.as_str()),
        })
    }
}

#[cfg(test)]
#[path = "preset/preset_tests.rs"]
mod preset_tests;
