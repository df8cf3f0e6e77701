//! Context: configuration, logger, and last-error state behind one handle

use crate::error_state::ErrorState;
use parking_lot::RwLock;
use satchel_archive::{
    InstallOptions, InstallSummary, Installer, Limits, PackOptions, PackSummary, UnpackSummary,
};
use satchel_core::{Config, LogLevel, SatchelError, SatchelResult};
use satchel_logging::{LogCallback, Logger};
use std::path::Path;
use std::sync::Arc;

/// Everything one host session needs
///
/// All methods take `&self` so a context can be shared between threads.
/// Fallible operations clear the error state on success and set it on
/// failure; with concurrent callers the slot reflects whichever operation
/// finished last.
pub struct SatchelContext {
    config: Arc<Config>,
    logger: Logger,
    errors: ErrorState,
    app_name: RwLock<Option<String>>,
}

impl SatchelContext {
    /// Create a context from the well-known settings source
    pub fn new() -> SatchelResult<Self> {
        Ok(Self::with_config(Config::load()?))
    }

    /// Create a context from an explicit settings file
    pub fn from_file(path: &Path) -> SatchelResult<Self> {
        Ok(Self::with_config(Config::load_from(path)?))
    }

    /// Create a context from already-resolved settings
    pub fn with_config(config: Config) -> Self {
        let logger = Logger::new(&config.logging);
        Self {
            config: Arc::new(config),
            logger,
            errors: ErrorState::new(),
            app_name: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    /// Set the application label; an empty name restores the configured one
    pub fn set_app_name(&self, name: &str) {
        let name = name.trim();
        *self.app_name.write() = (!name.is_empty()).then(|| name.to_string());
    }

    /// The label set by the host, else the configured `app_name`
    pub fn app_name(&self) -> String {
        self.app_name
            .read()
            .clone()
            .unwrap_or_else(|| self.config.app_name.clone())
    }

    /// Log a free-form message
    ///
    /// Unrecognized level names are logged at `info`. Never touches the
    /// error state.
    pub fn log(&self, level_name: &str, scope: &str, message: &str) -> bool {
        let level = level_name.parse().unwrap_or_else(|_| {
            tracing::debug!(level = level_name, "Unknown log level, using info");
            LogLevel::Info
        });
        self.logger.log(&self.app_name(), level, scope, message)
    }

    /// Log a named preset, optionally replacing its message
    pub fn log_preset(&self, name: &str, override_message: Option<&str>) -> SatchelResult<()> {
        let result = self
            .logger
            .log_preset(&self.app_name(), &self.config.presets, name, override_message)
            .map(|_| ());
        self.record(result)
    }

    /// Pack `source_dir` into `output`
    pub fn pack(&self, source_dir: &Path, output: &Path) -> SatchelResult<PackSummary> {
        let options = PackOptions {
            extension: self.config.archive.extension.clone(),
        };
        let result = satchel_archive::pack(source_dir, output, &options).map_err(SatchelError::from);

        if let Ok(summary) = &result {
            self.announce(
                "pack_ok",
                &format!(
                    "{} written ({} files, {} directories, {} bytes)",
                    summary.output.display(),
                    summary.files,
                    summary.directories,
                    summary.content_bytes
                ),
            );
        }
        self.record(result)
    }

    /// Unpack `archive` into `target_dir`
    pub fn unpack(&self, archive: &Path, target_dir: &Path) -> SatchelResult<UnpackSummary> {
        let result =
            satchel_archive::unpack(archive, target_dir, &self.limits()).map_err(SatchelError::from);

        if let Ok(summary) = &result {
            self.announce(
                "unpack_ok",
                &format!(
                    "{} extracted to {} ({} files, {} bytes)",
                    archive.display(),
                    summary.target.display(),
                    summary.files,
                    summary.content_bytes
                ),
            );
        }
        self.record(result)
    }

    /// Install `archive` at its default destination, using the configured
    /// overwrite policy
    pub fn install(&self, archive: &Path) -> SatchelResult<InstallSummary> {
        self.install_to(archive, None, self.config.install.overwrite)
    }

    /// Install `archive` at `destination` (or the default one)
    pub fn install_to(
        &self,
        archive: &Path,
        destination: Option<&Path>,
        overwrite: bool,
    ) -> SatchelResult<InstallSummary> {
        let installer = Installer::new(self.config.install.root.clone(), self.limits());
        let options = InstallOptions {
            app_name: self.app_name(),
            extension: self.config.archive.extension.clone(),
            overwrite,
        };
        let result = installer
            .install(archive, destination, &options)
            .map_err(SatchelError::from);

        if let Ok(summary) = &result {
            let verb = if summary.replaced { "replaced" } else { "installed" };
            self.announce(
                "install_ok",
                &format!("{} {verb} at {}", archive.display(), summary.destination.display()),
            );
        }
        self.record(result)
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub fn set_log_callback(&self, callback: Option<LogCallback>) {
        self.logger.set_callback(callback);
    }

    /// Message of the last failed operation, if it has not been cleared
    pub fn last_error(&self) -> Option<String> {
        self.errors.message()
    }

    pub fn clear_error(&self) {
        self.errors.clear();
    }

    /// See [`ErrorState::copy_into`]
    pub fn copy_last_error(&self, buffer: &mut [u8]) -> i32 {
        self.errors.copy_into(buffer)
    }

    /// See [`ErrorState::required_capacity`]
    pub fn last_error_len(&self) -> usize {
        self.errors.required_capacity()
    }

    /// Record `error` as the pending failure
    pub fn fail(&self, error: &SatchelError) {
        tracing::debug!(code = error.error_code(), "{error}");
        self.errors.set(error.to_string());
    }

    fn record<T>(&self, result: SatchelResult<T>) -> SatchelResult<T> {
        match &result {
            Ok(_) => self.errors.clear(),
            Err(e) => self.fail(e),
        }
        result
    }

    fn limits(&self) -> Limits {
        Limits::from(&self.config.archive)
    }

    fn announce(&self, preset: &str, message: &str) {
        if let Err(e) =
            self.logger
                .log_preset(&self.app_name(), &self.config.presets, preset, Some(message))
        {
            tracing::debug!(preset, error = %e, "Success preset not emitted");
        }
    }
}
