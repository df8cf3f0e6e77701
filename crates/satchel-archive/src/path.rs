//! Entry path validation.
//!
//! Archive paths are relative, `/`-separated UTF-8. Everything that could
//! resolve outside the extraction root is rejected before any byte of the
//! entry is written.

use crate::format::{EntryKind, MAX_PATH_LEN};
use crate::{ArchiveError, ArchiveResult};
use std::collections::HashMap;
use std::path::{Component, Path};

/// Check an entry path read from an archive.
///
/// Escapes (absolute, `..`, backslash, drive prefix) are
/// [`ArchiveError::PathTraversal`]; other malformed paths are
/// [`ArchiveError::InvalidArchive`].
pub fn validate_entry_path(path: &str) -> ArchiveResult<()> {
    if path.is_empty() {
        return Err(ArchiveError::InvalidArchive("empty entry path".to_string()));
    }
    if path.contains('\0') {
        return Err(ArchiveError::InvalidArchive(format!(
            "entry path `{}` contains a NUL byte",
            path.escape_debug()
        )));
    }
    check_escape(path)?;

    if path.split('/').any(|segment| segment.is_empty() || segment == ".") {
        return Err(ArchiveError::InvalidArchive(format!(
            "entry path `{path}` has an empty or `.` segment"
        )));
    }
    Ok(())
}

/// Check a symlink target read from an archive.
///
/// Targets must be relative and free of `..`, so the link resolves inside
/// the directory that holds it.
pub fn validate_link_target(target: &str) -> ArchiveResult<()> {
    if target.is_empty() {
        return Err(ArchiveError::InvalidArchive("empty symlink target".to_string()));
    }
    if target.contains('\0') {
        return Err(ArchiveError::InvalidArchive(
            "symlink target contains a NUL byte".to_string(),
        ));
    }
    check_escape(target)
}

fn check_escape(path: &str) -> ArchiveResult<()> {
    let reason = if path.starts_with('/') {
        Some("is absolute")
    } else if path.contains('\\') {
        Some("contains a backslash")
    } else if has_drive_prefix(path) {
        Some("has a drive prefix")
    } else if path.split('/').any(|segment| segment == "..") {
        Some("contains `..`")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ArchiveError::PathTraversal(format!("`{path}` {reason}"))),
        None => Ok(()),
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Convert a path relative to the pack root into its archive form.
pub fn to_archive_path(relative: &Path) -> ArchiveResult<String> {
    let mut out = String::new();
    for component in relative.components() {
        let Component::Normal(name) = component else {
            return Err(ArchiveError::UnencodablePath(relative.to_path_buf()));
        };
        let name = name
            .to_str()
            .ok_or_else(|| ArchiveError::UnencodablePath(relative.to_path_buf()))?;
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(name);
    }

    if out.len() > MAX_PATH_LEN {
        return Err(ArchiveError::UnencodablePath(relative.to_path_buf()));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
struct Seen {
    kind: EntryKind,
    explicit: bool,
}

/// Paths already decoded from one archive.
///
/// Rejects duplicates and entries nested under a file or symlink. Parent
/// directories that are only implied by a deeper entry may still appear
/// later as explicit directory entries.
#[derive(Debug, Default)]
pub struct PathSet {
    seen: HashMap<String, Seen>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Record `path`; it must already have passed [`validate_entry_path`].
    pub fn insert(&mut self, path: &str, kind: EntryKind) -> ArchiveResult<()> {
        for (idx, _) in path.match_indices('/') {
            let ancestor = &path[..idx];
            match self.seen.get(ancestor) {
                Some(seen) if seen.kind != EntryKind::Directory => {
                    return Err(ArchiveError::InvalidArchive(format!(
                        "`{path}` is nested under {} `{ancestor}`",
                        seen.kind
                    )));
                }
                Some(_) => {}
                None => {
                    self.seen.insert(
                        ancestor.to_string(),
                        Seen {
                            kind: EntryKind::Directory,
                            explicit: false,
                        },
                    );
                }
            }
        }

        match self.seen.get_mut(path) {
            Some(seen) if !seen.explicit && kind == EntryKind::Directory => {
                seen.explicit = true;
                Ok(())
            }
            Some(_) => Err(ArchiveError::InvalidArchive(format!(
                "duplicate entry `{path}`"
            ))),
            None => {
                self.seen.insert(
                    path.to_string(),
                    Seen {
                        kind,
                        explicit: true,
                    },
                );
                Ok(())
            }
        }
    }
}
