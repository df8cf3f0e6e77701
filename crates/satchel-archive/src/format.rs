//! On-disk layout of a satchel archive (format version 1).
//!
//! ```text
//! header:  magic[8]  89 'S' 'T' 'C' 'H' 0D 0A 1A
//!          version   u16
//!          flags     u16   (reserved, must be zero)
//!          entries   u64
//! entry:   kind      u8    (0 file, 1 directory, 2 symlink)
//!          mode      u32   (unix permission bits, 0 = unspecified)
//!          path_len  u32, path bytes (UTF-8, '/' separated)
//!          size      u64, content bytes
//! trailer: sha256[32] over every preceding byte
//! ```
//!
//! All integers are little-endian.

use crate::{ArchiveError, ArchiveResult};
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

/// File signature, PNG-style.
pub const MAGIC: [u8; 8] = [0x89, b'S', b'T', b'C', b'H', 0x0D, 0x0A, 0x1A];

/// The only version this build reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// Longest entry path or symlink target, in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Length of the SHA-256 trailer.
pub const DIGEST_LEN: usize = 32;

/// Kind of filesystem object an entry describes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File = 0,
    Directory = 1,
    Symlink = 2,
}

impl EntryKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EntryKind::File),
            1 => Some(EntryKind::Directory),
            2 => Some(EntryKind::Symlink),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub flags: u16,
    pub entry_count: u64,
}

impl Header {
    pub fn new(entry_count: u64) -> Self {
        Self {
            version: FORMAT_VERSION,
            flags: 0,
            entry_count,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.flags.to_le_bytes())?;
        w.write_all(&self.entry_count.to_le_bytes())
    }

    /// Read and validate a header.
    ///
    /// The version is checked before anything past the header is touched.
    pub fn read_from<R: Read>(r: &mut R) -> ArchiveResult<Self> {
        let mut magic = [0u8; 8];
        read_exact(r, &mut magic)?;
        if magic != MAGIC {
            return Err(ArchiveError::InvalidArchive(
                "not a satchel archive (bad magic)".to_string(),
            ));
        }

        let version = read_u16(r)?;
        if version != FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }

        let flags = read_u16(r)?;
        if flags != 0 {
            return Err(ArchiveError::InvalidArchive(format!(
                "unsupported header flags {flags:#06x}"
            )));
        }

        let entry_count = read_u64(r)?;
        Ok(Self {
            version,
            flags,
            entry_count,
        })
    }
}

/// Metadata of one entry; its content follows it in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub kind: EntryKind,
    /// Unix permission bits, 0 when unspecified
    pub mode: u32,
    /// Relative path with `/` separators
    pub path: String,
    /// Content length in bytes (link target length for symlinks)
    pub size: u64,
}

impl EntryInfo {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let path_len = u32::try_from(self.path.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "entry path too long"))?;

        w.write_all(&[self.kind as u8])?;
        w.write_all(&self.mode.to_le_bytes())?;
        w.write_all(&path_len.to_le_bytes())?;
        w.write_all(self.path.as_bytes())?;
        w.write_all(&self.size.to_le_bytes())
    }

    /// Read entry metadata, leaving the stream positioned at its content.
    ///
    /// Only structural checks happen here; path safety is the caller's job.
    pub fn read_from<R: Read>(r: &mut R) -> ArchiveResult<Self> {
        let mut kind = [0u8; 1];
        read_exact(r, &mut kind)?;
        let kind = EntryKind::from_u8(kind[0]).ok_or_else(|| {
            ArchiveError::InvalidArchive(format!("unknown entry kind {}", kind[0]))
        })?;

        let mode = read_u32(r)?;

        let path_len = read_u32(r)? as usize;
        if path_len > MAX_PATH_LEN {
            return Err(ArchiveError::InvalidArchive(format!(
                "entry path length {path_len} exceeds {MAX_PATH_LEN}"
            )));
        }
        let mut path = vec![0u8; path_len];
        read_exact(r, &mut path)?;
        let path = String::from_utf8(path).map_err(|_| {
            ArchiveError::InvalidArchive("entry path is not valid UTF-8".to_string())
        })?;

        let size = read_u64(r)?;
        match kind {
            EntryKind::Directory if size != 0 => {
                return Err(ArchiveError::InvalidArchive(format!(
                    "directory entry `{path}` has {size} content bytes"
                )));
            }
            EntryKind::Symlink if size > MAX_PATH_LEN as u64 => {
                return Err(ArchiveError::InvalidArchive(format!(
                    "symlink target of `{path}` exceeds {MAX_PATH_LEN} bytes"
                )));
            }
            _ => {}
        }

        Ok(Self {
            kind,
            mode,
            path,
            size,
        })
    }
}

/// `read_exact` that reports a short read as a truncated archive.
pub(crate) fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> ArchiveResult<()> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ArchiveError::Truncated
        } else {
            ArchiveError::Io(e)
        }
    })
}

fn read_u16<R: Read>(r: &mut R) -> ArchiveResult<u16> {
    let mut buf = [0u8; 2];
    read_exact(r, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> ArchiveResult<u32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> ArchiveResult<u64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Writer adapter that hashes everything written through it.
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Stop hashing; returns the inner writer and the digest so far.
    pub fn finish(self) -> (W, [u8; DIGEST_LEN]) {
        (self.inner, self.hasher.finalize().into())
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Reader adapter that hashes everything read through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Digest of the bytes read so far.
    pub fn digest(&self) -> [u8; DIGEST_LEN] {
        self.hasher.clone().finalize().into()
    }

    /// Access the underlying reader without hashing.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Lower-case hex form of a trailer digest.
pub fn digest_hex(digest: &[u8; DIGEST_LEN]) -> String {
    hex::encode(digest)
}
