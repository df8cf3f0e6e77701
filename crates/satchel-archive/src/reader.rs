//! Streaming archive reader.
//!
//! The [`ArchiveReader`] decodes entries one at a time, validating each path
//! and charging the decode budget before any content is read.

use crate::format::{DIGEST_LEN, EntryInfo, HashingReader, Header, digest_hex, read_exact};
use crate::limits::Budget;
use crate::path::{PathSet, validate_entry_path};
use crate::{ArchiveError, ArchiveResult, Limits};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Reader over one archive stream.
///
/// # Example
///
/// ```no_run
/// use satchel_archive::{ArchiveReader, Limits};
///
/// let mut reader = ArchiveReader::open("app.satchel", Limits::default())?;
/// while let Some(entry) = reader.next_entry()? {
///     println!("{} {}", entry.kind, entry.path);
/// }
/// reader.finish()?;
/// # Ok::<(), satchel_archive::ArchiveError>(())
/// ```
pub struct ArchiveReader<R> {
    inner: HashingReader<R>,
    header: Header,
    remaining: u64,
    /// Content bytes of the current entry not yet consumed
    pending: u64,
    budget: Budget,
    paths: PathSet,
}

impl ArchiveReader<BufReader<File>> {
    /// Open an archive file for reading.
    pub fn open<P: AsRef<Path>>(path: P, limits: Limits) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::SourceNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.is_dir() {
            return Err(ArchiveError::SourceNotFound(path.to_path_buf()));
        }

        Self::new(BufReader::new(file), limits)
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Read the header from `reader`.
    pub fn new(reader: R, limits: Limits) -> ArchiveResult<Self> {
        let mut inner = HashingReader::new(reader);
        let header = Header::read_from(&mut inner)?;

        let budget = Budget::new(limits);
        budget.check_declared_entries(header.entry_count)?;

        Ok(Self {
            inner,
            header,
            remaining: header.entry_count,
            pending: 0,
            budget,
            paths: PathSet::new(),
        })
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Content bytes accepted so far.
    pub fn decoded_bytes(&self) -> u64 {
        self.budget.bytes()
    }

    /// Decode the next entry's metadata.
    ///
    /// Unread content of the previous entry is skipped. Returns `None` once
    /// every declared entry has been read.
    pub fn next_entry(&mut self) -> ArchiveResult<Option<EntryInfo>> {
        self.skip_content()?;
        if self.remaining == 0 {
            return Ok(None);
        }

        let entry = EntryInfo::read_from(&mut self.inner)?;
        validate_entry_path(&entry.path)?;
        self.paths.insert(&entry.path, entry.kind)?;
        self.budget.charge(&entry.path, entry.size)?;

        self.remaining -= 1;
        self.pending = entry.size;
        Ok(Some(entry))
    }

    /// Stream the current entry's content into `out`.
    pub fn copy_content<W: Write>(&mut self, out: &mut W) -> ArchiveResult<u64> {
        let expected = self.pending;
        let copied = io::copy(&mut (&mut self.inner).take(expected), out)?;
        self.pending -= copied;
        if copied < expected {
            return Err(ArchiveError::Truncated);
        }
        Ok(copied)
    }

    /// Read the current entry's content into memory.
    ///
    /// Intended for symlink targets, which are bounded in size.
    pub fn read_content(&mut self) -> ArchiveResult<Vec<u8>> {
        let len = usize::try_from(self.pending).map_err(|_| {
            ArchiveError::SizeLimitExceeded("entry too large to buffer".to_string())
        })?;
        let mut buf = vec![0u8; len];
        read_exact(&mut self.inner, &mut buf)?;
        self.pending = 0;
        Ok(buf)
    }

    /// Verify the trailer digest and that nothing follows it.
    pub fn finish(mut self) -> ArchiveResult<()> {
        while self.next_entry()?.is_some() {}
        self.skip_content()?;

        let actual = self.inner.digest();
        let mut expected = [0u8; DIGEST_LEN];
        read_exact(self.inner.inner_mut(), &mut expected)?;
        if actual != expected {
            return Err(ArchiveError::ChecksumMismatch {
                expected: digest_hex(&expected),
                actual: digest_hex(&actual),
            });
        }

        let mut extra = [0u8; 1];
        if self.inner.inner_mut().read(&mut extra)? != 0 {
            return Err(ArchiveError::InvalidArchive(
                "unexpected data after trailer".to_string(),
            ));
        }
        Ok(())
    }

    fn skip_content(&mut self) -> ArchiveResult<()> {
        if self.pending > 0 {
            self.copy_content(&mut io::sink())?;
        }
        Ok(())
    }
}

/// List an archive's entries without extracting.
///
/// The whole archive is read so the trailer digest is verified too.
pub fn list<P: AsRef<Path>>(path: P, limits: Limits) -> ArchiveResult<Vec<EntryInfo>> {
    let mut reader = ArchiveReader::open(path, limits)?;
    let mut entries = Vec::with_capacity(reader.header().entry_count.min(1024) as usize);
    while let Some(entry) = reader.next_entry()? {
        entries.push(entry);
    }
    reader.finish()?;
    Ok(entries)
}

#[cfg(test)]
#[path = "reader/reader_tests.rs"]
mod reader_tests;
