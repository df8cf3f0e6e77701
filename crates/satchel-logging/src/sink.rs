//! Console and file sinks

use crate::logger::LogRecord;
use crate::markup;
use colored::Colorize;
use parking_lot::Mutex;
use satchel_core::{ColorMode, LineTemplate, LogLevel, LoggingConfig, Palette, Placeholder, TagStyle};
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

fn colorize_tag(level: LogLevel, tag: &str, palette: &Palette) -> String {
    if let Some(rgb) = palette.level(level) {
        return tag.truecolor(rgb.r, rgb.g, rgb.b).to_string();
    }
    match level {
        LogLevel::Trace => tag.dimmed().to_string(),
        LogLevel::Debug => tag.blue().to_string(),
        LogLevel::Info => tag.green().to_string(),
        LogLevel::Warn => tag.yellow().to_string(),
        LogLevel::Error => tag.red().bold().to_string(),
        LogLevel::Off => tag.to_string(),
    }
}

/// Everything needed to turn a record into one line of text
#[derive(Debug, Clone)]
pub struct LineFormat {
    template: LineTemplate,
    timestamp_format: String,
    tag: TagStyle,
    palette: Palette,
}

impl LineFormat {
    /// Default tag style, no palette
    pub fn new(template: LineTemplate, timestamp_format: impl Into<String>) -> Self {
        Self {
            template,
            timestamp_format: timestamp_format.into(),
            tag: TagStyle::default(),
            palette: Palette::new(),
        }
    }

    /// `template` with the tag style, palette, and timestamp format of `config`
    pub fn from_config(template: &LineTemplate, config: &LoggingConfig) -> Self {
        Self::new(template.clone(), config.timestamp_format.clone())
            .with_tag_style(config.tag.clone())
            .with_palette(config.colors.clone())
    }

    pub fn with_tag_style(mut self, tag: TagStyle) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Render `record`
    ///
    /// With `colorize` the tag is colored and message markup becomes ANSI
    /// styling; without it markup tags are removed. The timestamp is only
    /// formatted when the template asks for it.
    pub fn render(&self, record: &LogRecord<'_>, colorize: bool) -> String {
        self.template.render_with(|field, out| match field {
            Placeholder::Timestamp => {
                out.push_str(&record.timestamp.format(&self.timestamp_format).to_string());
            }
            Placeholder::Level => out.push_str(&record.level.to_string()),
            Placeholder::Tag => {
                let tag = self.tag.render(record.level);
                if colorize {
                    out.push_str(&colorize_tag(record.level, &tag, &self.palette));
                } else {
                    out.push_str(&tag);
                }
            }
            Placeholder::App => out.push_str(record.app),
            Placeholder::Scope => out.push_str(record.scope),
            Placeholder::Message if colorize => {
                out.push_str(&markup::render(record.message, &self.palette));
            }
            Placeholder::Message => out.push_str(&markup::strip(record.message)),
        })
    }
}

/// Writes formatted lines to standard output
pub struct ConsoleSink {
    format: LineFormat,
    colorize: bool,
}

impl ConsoleSink {
    pub fn new(format: LineFormat, color: ColorMode) -> Self {
        let colorize = match color {
            ColorMode::Never => false,
            ColorMode::Always => {
                colored::control::set_override(true);
                true
            }
            ColorMode::Auto => {
                io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };

        Self { format, colorize }
    }

    /// Whether tags and markup carry ANSI styling
    pub fn colorize(&self) -> bool {
        self.colorize
    }

    pub fn format(&self, record: &LogRecord<'_>) -> String {
        self.format.render(record, self.colorize)
    }

    pub fn write(&self, record: &LogRecord<'_>) -> io::Result<()> {
        let mut line = self.format(record);
        line.push('\n');

        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

/// Appends formatted lines to a file
///
/// The file is opened lazily on the first write, creating missing parent
/// directories. Each line goes out in a single `write_all` under the lock so
/// concurrent writers never interleave within a line.
pub struct FileSink {
    path: PathBuf,
    format: LineFormat,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, format: LineFormat) -> Self {
        Self {
            path: path.into(),
            format,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self, record: &LogRecord<'_>) -> String {
        self.format.render(record, false)
    }

    pub fn write(&self, record: &LogRecord<'_>) -> io::Result<()> {
        let mut line = self.format(record);
        line.push('\n');

        let mut guard = self.file.lock();
        if guard.is_none() {
            *guard = Some(self.open()?);
        }

        let result = match guard.as_mut() {
            Some(file) => file.write_all(line.as_bytes()),
            None => Ok(()),
        };
        if result.is_err() {
            // Reopen on the next write
            *guard = None;
        }
        result
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn open(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}
