//! Archive creation.
//!
//! [`pack`] walks a directory tree in a deterministic order and writes it
//! into a temporary file next to the output, which is only renamed into
//! place once the trailer has been written.

use crate::format::{EntryInfo, EntryKind, HashingWriter, Header, digest_hex};
use crate::path::{to_archive_path, validate_link_target};
use crate::{ArchiveError, ArchiveResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Options for [`pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Expected output extension, without the dot; a mismatch is only logged
    pub extension: String,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            extension: "satchel".to_string(),
        }
    }
}

/// Outcome of a successful [`pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub output: PathBuf,
    pub files: u64,
    pub directories: u64,
    pub symlinks: u64,
    /// Total content bytes stored
    pub content_bytes: u64,
    /// Hex-encoded trailer digest
    pub digest: String,
}

/// An entry found during the walk, written in a second pass.
struct PendingEntry {
    info: EntryInfo,
    source: PathBuf,
    link_target: Option<String>,
}

/// Pack `source_dir` into the archive file `output`.
///
/// Entries are emitted depth-first, sorted by file name within each
/// directory, directories before their children. Symlinks are stored as
/// links and never followed; a link whose target is absolute or climbs out
/// with `..` fails the pack with [`ArchiveError::PathTraversal`], since
/// unpack would refuse it. The output file is skipped if it lives inside
/// `source_dir`.
pub fn pack(source_dir: &Path, output: &Path, options: &PackOptions) -> ArchiveResult<PackSummary> {
    match fs::metadata(source_dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ArchiveError::SourceNotFound(source_dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ArchiveError::SourceNotFound(source_dir.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }

    if output.extension().and_then(|e| e.to_str()) != Some(options.extension.as_str()) {
        tracing::warn!(
            output = %output.display(),
            expected = %options.extension,
            "Archive output does not use the configured extension"
        );
    }

    let file_name = output.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let parent = fs::canonicalize(parent)?;
    let output_abs = parent.join(file_name);

    let mut temp = tempfile::Builder::new()
        .prefix(".satchel-pack-")
        .tempfile_in(&parent)?;

    let root = fs::canonicalize(source_dir)?;
    let excluded = [output_abs, temp.path().to_path_buf()];
    let mut entries = Vec::new();
    walk(&root, &root, &excluded, &mut entries)?;
    tracing::debug!(
        source = %root.display(),
        entries = entries.len(),
        "Collected entries for packing"
    );

    let mut summary = PackSummary {
        output: output.to_path_buf(),
        files: 0,
        directories: 0,
        symlinks: 0,
        content_bytes: 0,
        digest: String::new(),
    };

    {
        let mut w = HashingWriter::new(BufWriter::new(temp.as_file_mut()));
        Header::new(entries.len() as u64).write_to(&mut w)?;

        for entry in &entries {
            entry.info.write_to(&mut w)?;
            match entry.info.kind {
                EntryKind::File => {
                    write_file_content(&entry.source, entry.info.size, &mut w)?;
                    summary.files += 1;
                }
                EntryKind::Directory => summary.directories += 1,
                EntryKind::Symlink => {
                    if let Some(target) = &entry.link_target {
                        w.write_all(target.as_bytes())?;
                    }
                    summary.symlinks += 1;
                }
            }
            summary.content_bytes += entry.info.size;
        }

        let (mut inner, digest) = w.finish();
        inner.write_all(&digest)?;
        inner.flush()?;
        summary.digest = digest_hex(&digest);
    }

    temp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o644))?;
    }
    temp.persist(output).map_err(|e| ArchiveError::Io(e.error))?;

    tracing::debug!(
        output = %output.display(),
        files = summary.files,
        directories = summary.directories,
        symlinks = summary.symlinks,
        bytes = summary.content_bytes,
        "Archive written"
    );
    Ok(summary)
}

fn walk(
    root: &Path,
    dir: &Path,
    excluded: &[PathBuf],
    out: &mut Vec<PendingEntry>,
) -> ArchiveResult<()> {
    let mut children = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let source = child.path();
        if excluded.contains(&source) {
            continue;
        }

        let relative = source
            .strip_prefix(root)
            .map_err(|_| ArchiveError::UnencodablePath(source.clone()))?;
        let path = to_archive_path(relative)?;
        let meta = fs::symlink_metadata(&source)?;
        let file_type = meta.file_type();

        let mut link_target = None;
        let (kind, size) = if file_type.is_symlink() {
            let target = read_link_target(&source)?;
            let size = target.len() as u64;
            link_target = Some(target);
            (EntryKind::Symlink, size)
        } else if file_type.is_dir() {
            (EntryKind::Directory, 0)
        } else if file_type.is_file() {
            (EntryKind::File, meta.len())
        } else {
            tracing::debug!(path = %source.display(), "Skipping special file");
            continue;
        };

        out.push(PendingEntry {
            info: EntryInfo {
                kind,
                mode: entry_mode(&meta),
                path,
                size,
            },
            source: source.clone(),
            link_target,
        });

        if kind == EntryKind::Directory {
            walk(root, &source, excluded, out)?;
        }
    }
    Ok(())
}

fn read_link_target(link: &Path) -> ArchiveResult<String> {
    let target = fs::read_link(link)?;
    let target = target
        .to_str()
        .ok_or_else(|| ArchiveError::UnencodablePath(link.to_path_buf()))?;
    if let Err(e) = validate_link_target(target) {
        tracing::debug!(link = %link.display(), error = %e, "Refusing symlink");
        return Err(e);
    }
    Ok(target.to_string())
}

/// Copy exactly `size` bytes; a file that shrank since the walk is an error.
fn write_file_content<W: Write>(source: &Path, size: u64, w: &mut W) -> ArchiveResult<()> {
    let file = File::open(source)?;
    let copied = io::copy(&mut file.take(size), w)?;
    if copied != size {
        return Err(ArchiveError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} changed while packing", source.display()),
        )));
    }
    Ok(())
}

#[cfg(unix)]
fn entry_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn entry_mode(_meta: &fs::Metadata) -> u32 {
    0
}
