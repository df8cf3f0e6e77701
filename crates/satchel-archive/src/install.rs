//! Archive installation.
//!
//! The [`Installer`] unpacks an archive into a per-application directory
//! under an install root, refusing to clobber existing content unless
//! asked to.

use crate::extract::{UnpackSummary, unpack};
use crate::{ArchiveError, ArchiveResult, Limits};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-call install settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Directory name under the install root
    pub app_name: String,
    /// Archive extension stripped when deriving the package directory name
    pub extension: String,
    /// Replace a non-empty destination instead of failing
    pub overwrite: bool,
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub destination: PathBuf,
    /// Whether previous content was replaced
    pub replaced: bool,
    pub unpacked: UnpackSummary,
}

/// Installs archives under a root directory.
#[derive(Debug, Clone)]
pub struct Installer {
    root: Option<PathBuf>,
    limits: Limits,
}

impl Installer {
    pub fn new(root: Option<PathBuf>, limits: Limits) -> Self {
        Self { root, limits }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// `<root>/<app name>/<archive name without extension>`
    pub fn default_destination(
        &self,
        archive: &Path,
        options: &InstallOptions,
    ) -> ArchiveResult<PathBuf> {
        let root = self.root.as_deref().ok_or(ArchiveError::NoInstallRoot)?;

        let app = options.app_name.as_str();
        if !is_single_component(app) {
            return Err(ArchiveError::InvalidDestination(format!(
                "application name `{app}` cannot be used as a directory name"
            )));
        }

        let package = package_name(archive, &options.extension).ok_or_else(|| {
            ArchiveError::InvalidDestination(format!(
                "cannot derive a package name from {}",
                archive.display()
            ))
        })?;

        Ok(root.join(app).join(package))
    }

    /// Install `archive` into `destination`, or the default destination.
    ///
    /// A missing or empty destination is unpacked into directly. A non-empty
    /// one fails with [`ArchiveError::DestinationExists`] unless
    /// `options.overwrite` is set, in which case the new content is fully
    /// extracted beside it before the old content is removed.
    pub fn install(
        &self,
        archive: &Path,
        destination: Option<&Path>,
        options: &InstallOptions,
    ) -> ArchiveResult<InstallSummary> {
        match fs::metadata(archive) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(ArchiveError::SourceNotFound(archive.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::SourceNotFound(archive.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }

        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None => self.default_destination(archive, options)?,
        };

        if !is_occupied(&destination)? {
            let unpacked = unpack(archive, &destination, &self.limits)?;
            tracing::debug!(destination = %destination.display(), "Installed archive");
            return Ok(InstallSummary {
                destination,
                replaced: false,
                unpacked,
            });
        }

        if !options.overwrite {
            return Err(ArchiveError::DestinationExists(destination));
        }

        let unpacked = self.replace(archive, &destination)?;
        tracing::debug!(destination = %destination.display(), "Replaced installed archive");
        Ok(InstallSummary {
            destination,
            replaced: true,
            unpacked,
        })
    }

    fn replace(&self, archive: &Path, destination: &Path) -> ArchiveResult<UnpackSummary> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let staging = tempfile::Builder::new()
            .prefix(".satchel-install-")
            .tempdir_in(parent)?;
        let mut unpacked = unpack(archive, staging.path(), &self.limits)?;

        let retired = tempfile::Builder::new()
            .prefix(".satchel-retired-")
            .tempdir_in(parent)?;
        let old = retired.path().join("old");
        fs::rename(destination, &old)?;

        if let Err(e) = fs::rename(staging.path(), destination) {
            if let Err(restore) = fs::rename(&old, destination) {
                tracing::error!(
                    destination = %destination.display(),
                    error = %restore,
                    "Failed to restore previous install"
                );
            }
            return Err(e.into());
        }
        // Moved into place; nothing left for the guard to remove
        let _ = staging.keep();

        unpacked.target = destination.to_path_buf();
        Ok(unpacked)
    }
}

/// Anything other than a missing path or an empty directory.
fn is_occupied(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(fs::read_dir(path)?.next().is_some()),
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !(name.len() >= 2 && name.as_bytes()[1] == b':')
}

/// File name with `.<extension>` stripped, or the plain stem for other names.
fn package_name(archive: &Path, extension: &str) -> Option<String> {
    let file_name = archive.file_name()?.to_str()?;
    let suffix = format!(".{extension}");
    let stem = match file_name.strip_suffix(&suffix) {
        Some(stem) => stem,
        None => archive.file_stem()?.to_str()?,
    };
    (!stem.is_empty()).then(|| stem.to_string())
}
