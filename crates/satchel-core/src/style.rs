//! Level tag and color settings
//!
//! A [`TagStyle`] turns a level into the label substituted for `{tag}`. A
//! [`Palette`] maps level names and markup names to 24-bit colors.

use crate::LogLevel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Case applied to a level label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagTransform {
    #[default]
    #[serde(alias = "uppercase")]
    Upper,
    #[serde(alias = "lowercase")]
    Lower,
    /// First character upper-cased, the rest left alone
    Capitalize,
    #[serde(rename = "none")]
    Verbatim,
}

impl TagTransform {
    pub fn apply(self, label: &str) -> String {
        match self {
            TagTransform::Upper => label.to_uppercase(),
            TagTransform::Lower => label.to_lowercase(),
            TagTransform::Capitalize => {
                let mut chars = label.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            TagTransform::Verbatim => label.to_string(),
        }
    }
}

/// Where a short label sits inside `min_width`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagAlign {
    #[default]
    Left,
    #[serde(alias = "centre")]
    Center,
    Right,
}

/// How a level is rendered for the `{tag}` placeholder
///
/// The default renders `[INFO ]`, `[WARN ]`, `[ERROR]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStyle {
    pub prefix: String,
    pub suffix: String,
    pub transform: TagTransform,
    /// Labels shorter than this many characters are padded with spaces
    pub min_width: usize,
    pub align: TagAlign,
    /// Replacement labels; levels not listed use their own name
    pub labels: BTreeMap<LogLevel, String>,
}

impl Default for TagStyle {
    fn default() -> Self {
        Self {
            prefix: "[".to_string(),
            suffix: "]".to_string(),
            transform: TagTransform::Upper,
            min_width: 5,
            align: TagAlign::Left,
            labels: BTreeMap::new(),
        }
    }
}

impl TagStyle {
    /// Render the tag for `level`; long labels are never truncated
    pub fn render(&self, level: LogLevel) -> String {
        let label = self
            .labels
            .get(&level)
            .map(String::as_str)
            .unwrap_or(level.as_str());
        let label = self.transform.apply(label);

        let padding = self.min_width.saturating_sub(label.chars().count());
        let (left, right) = match self.align {
            TagAlign::Left => (0, padding),
            TagAlign::Center => (padding / 2, padding - padding / 2),
            TagAlign::Right => (padding, 0),
        };

        format!(
            "{}{}{}{}{}",
            self.prefix,
            " ".repeat(left),
            label,
            " ".repeat(right),
            self.suffix
        )
    }
}

/// A 24-bit color, written `#rrggbb` in settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("`{s}` is not a #rrggbb color"));
        }

        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|e| e.to_string());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Named colors from the `[logging.colors]` table
///
/// Level names (`info`, `warn`, ...) color the console tag; any name can be
/// used as a markup tag in messages. Names are matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: BTreeMap<String, Rgb>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, color: Rgb) {
        self.colors.insert(name.into(), color);
    }

    pub fn get(&self, name: &str) -> Option<Rgb> {
        self.colors.get(name).copied()
    }

    /// Color configured for `level`'s tag
    pub fn level(&self, level: LogLevel) -> Option<Rgb> {
        self.get(level.as_str())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
