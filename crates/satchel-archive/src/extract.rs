//! Archive extraction.
//!
//! Entries are decoded into a hidden staging directory created inside the
//! target. Only after the trailer digest checks out are they moved into the
//! target, so a corrupt or hostile archive never leaves partial output.

use crate::format::EntryKind;
use crate::path::validate_link_target;
use crate::reader::ArchiveReader;
use crate::{ArchiveError, ArchiveResult, Limits};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Prefix of the staging directory created inside the target.
pub const STAGING_PREFIX: &str = ".satchel-unpack-";

/// Outcome of a successful [`unpack`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    pub target: PathBuf,
    pub files: u64,
    pub directories: u64,
    pub symlinks: u64,
    pub content_bytes: u64,
}

/// Extract `archive` into `target_dir`, creating it if needed.
///
/// Existing files are replaced and existing directories merged. On failure
/// the target is left as it was; if this call created it, it is removed.
/// `target_dir` itself may be a symlink to a directory; links below it are
/// never followed.
pub fn unpack(archive: &Path, target_dir: &Path, limits: &Limits) -> ArchiveResult<UnpackSummary> {
    let reader = ArchiveReader::open(archive, *limits)?;

    let created = match fs::metadata(target_dir) {
        Ok(meta) if meta.is_dir() => false,
        Ok(_) => return Err(ArchiveError::NotADirectory(target_dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(target_dir)?;
            true
        }
        Err(e) => return Err(e.into()),
    };

    let result = extract_into(reader, target_dir);
    if let Err(e) = &result {
        tracing::debug!(
            archive = %archive.display(),
            target = %target_dir.display(),
            error = %e,
            "Unpack failed, target left unchanged"
        );
        if created && let Err(cleanup) = fs::remove_dir_all(target_dir) {
            tracing::warn!(
                target = %target_dir.display(),
                error = %cleanup,
                "Failed to remove target created by failed unpack"
            );
        }
    }
    result
}

fn extract_into<R: Read>(
    mut reader: ArchiveReader<R>,
    target_dir: &Path,
) -> ArchiveResult<UnpackSummary> {
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(target_dir)?;

    let mut summary = UnpackSummary {
        target: target_dir.to_path_buf(),
        ..UnpackSummary::default()
    };
    let mut dir_modes: Vec<(String, u32)> = Vec::new();
    let mut links: Vec<(String, String)> = Vec::new();

    while let Some(entry) = reader.next_entry()? {
        let dest = staging.path().join(&entry.path);
        match entry.kind {
            EntryKind::Directory => {
                fs::create_dir_all(&dest)?;
                if entry.mode != 0 {
                    dir_modes.push((entry.path, entry.mode));
                }
                summary.directories += 1;
            }
            EntryKind::File => {
                create_parent(&dest)?;
                let mut out = BufWriter::new(File::create(&dest)?);
                summary.content_bytes += reader.copy_content(&mut out)?;
                out.flush()?;
                drop(out);
                set_mode(&dest, entry.mode)?;
                summary.files += 1;
            }
            EntryKind::Symlink => {
                if !cfg!(unix) {
                    return Err(ArchiveError::InvalidArchive(format!(
                        "symlink entry `{}` is not supported on this platform",
                        entry.path
                    )));
                }
                let target = String::from_utf8(reader.read_content()?).map_err(|_| {
                    ArchiveError::InvalidArchive(format!(
                        "symlink target of `{}` is not valid UTF-8",
                        entry.path
                    ))
                })?;
                validate_link_target(&target)?;
                summary.content_bytes += entry.size;
                links.push((entry.path, target));
            }
        }
    }
    reader.finish()?;

    // Links go in last so no file write can pass through one
    for (path, target) in &links {
        let dest = staging.path().join(path);
        create_parent(&dest)?;
        make_symlink(target, &dest)?;
        summary.symlinks += 1;
    }

    commit(staging.path(), target_dir)?;

    // Deepest first: a parent without search permission hides its children
    for (path, mode) in dir_modes.iter().rev() {
        set_mode(&target_dir.join(path), *mode)?;
    }

    tracing::debug!(
        target = %target_dir.display(),
        files = summary.files,
        directories = summary.directories,
        symlinks = summary.symlinks,
        "Archive extracted"
    );
    Ok(summary)
}

/// Move everything under `staged` into `dest`.
///
/// Directories merge into existing directories; anything else replaces
/// what is there. Existing symlinks in `dest` are replaced, never followed.
fn commit(staged: &Path, dest: &Path) -> ArchiveResult<()> {
    for child in fs::read_dir(staged)? {
        let child = child?;
        let from = child.path();
        let to = dest.join(child.file_name());
        let is_dir = child.file_type()?.is_dir();

        match fs::symlink_metadata(&to) {
            Ok(existing) if existing.is_dir() && is_dir => {
                commit(&from, &to)?;
                continue;
            }
            Ok(existing) if existing.is_dir() => fs::remove_dir_all(&to)?,
            Ok(_) => fs::remove_file(&to)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::rename(&from, &to)?;
    }
    Ok(())
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if mode == 0 {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &str, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn make_symlink(_target: &str, link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot create symlink {}", link.display()),
    ))
}
