#![allow(non_snake_case)]

use super::*;
use crate::format::{EntryKind, HashingWriter};
use std::io::Cursor;

fn raw_archive(entries: &[(EntryKind, &str, &[u8])]) -> Vec<u8> {
    let mut w = HashingWriter::new(Vec::new());
    Header::new(entries.len() as u64).write_to(&mut w).unwrap();
    for (kind, path, content) in entries {
        EntryInfo {
            kind: *kind,
            mode: 0o644,
            path: path.to_string(),
            size: content.len() as u64,
        }
        .write_to(&mut w)
        .unwrap();
        w.write_all(content).unwrap();
    }
    let (mut bytes, digest) = w.finish();
    bytes.extend_from_slice(&digest);
    bytes
}

fn reader(bytes: Vec<u8>) -> ArchiveReader<Cursor<Vec<u8>>> {
    ArchiveReader::new(Cursor::new(bytes), Limits::default()).unwrap()
}

#[test]
fn ArchiveReader___entries___are_returned_in_order() {
    let bytes = raw_archive(&[
        (EntryKind::Directory, "dir", b""),
        (EntryKind::File, "dir/a.txt", b"alpha"),
    ]);
    let mut reader = reader(bytes);

    let first = reader.next_entry().unwrap().unwrap();
    let second = reader.next_entry().unwrap().unwrap();

    assert_eq!(first.kind, EntryKind::Directory);
    assert_eq!(second.path, "dir/a.txt");
    assert_eq!(second.size, 5);
    assert!(reader.next_entry().unwrap().is_none());
    reader.finish().unwrap();
}

#[test]
fn ArchiveReader___copy_content___streams_entry_bytes() {
    let mut reader = reader(raw_archive(&[(EntryKind::File, "f", b"payload")]));
    reader.next_entry().unwrap();
    let mut out = Vec::new();

    let n = reader.copy_content(&mut out).unwrap();

    assert_eq!(n, 7);
    assert_eq!(out, b"payload");
    assert_eq!(reader.decoded_bytes(), 7);
}

#[test]
fn ArchiveReader___unread_content___is_skipped() {
    let mut reader = reader(raw_archive(&[
        (EntryKind::File, "a", b"first"),
        (EntryKind::File, "b", b"second"),
    ]));

    reader.next_entry().unwrap();
    let second = reader.next_entry().unwrap().unwrap();

    assert_eq!(second.path, "b");
    reader.finish().unwrap();
}

#[test]
fn ArchiveReader___flipped_content_byte___fails_checksum() {
    let mut bytes = raw_archive(&[(EntryKind::File, "f", b"important")]);
    let pos = bytes.len() - 32 - 1;
    bytes[pos] ^= 0x01;

    let err = reader(bytes).finish().unwrap_err();

    assert!(matches!(err, ArchiveError::ChecksumMismatch { .. }));
}

#[test]
fn ArchiveReader___trailing_garbage___is_invalid() {
    let mut bytes = raw_archive(&[(EntryKind::File, "f", b"x")]);
    bytes.push(0);

    let err = reader(bytes).finish().unwrap_err();

    assert!(err.to_string().contains("after trailer"));
}

#[test]
fn ArchiveReader___missing_trailer___is_truncated() {
    let mut bytes = raw_archive(&[(EntryKind::File, "f", b"x")]);
    bytes.truncate(bytes.len() - 10);

    let err = reader(bytes).finish().unwrap_err();

    assert!(matches!(err, ArchiveError::Truncated));
}

#[test]
fn ArchiveReader___short_content___is_truncated() {
    let bytes = raw_archive(&[(EntryKind::File, "f", b"0123456789")]);
    let cut = bytes.len() - 32 - 5;
    let mut reader = reader(bytes[..cut].to_vec());
    reader.next_entry().unwrap();

    let err = reader.copy_content(&mut Vec::new()).unwrap_err();

    assert!(matches!(err, ArchiveError::Truncated));
}

#[test]
fn ArchiveReader___traversal_path___is_rejected_before_content() {
    let mut reader = reader(raw_archive(&[(EntryKind::File, "../evil", b"x")]));

    let err = reader.next_entry().unwrap_err();

    assert!(matches!(err, ArchiveError::PathTraversal(_)));
}

#[test]
fn ArchiveReader___duplicate_path___is_invalid() {
    let mut reader = reader(raw_archive(&[
        (EntryKind::File, "same", b"1"),
        (EntryKind::File, "same", b"2"),
    ]));
    reader.next_entry().unwrap();

    let err = reader.next_entry().unwrap_err();

    assert!(matches!(err, ArchiveError::InvalidArchive(_)));
}

#[test]
fn ArchiveReader___byte_budget___checked_against_declared_size() {
    let bytes = raw_archive(&[(EntryKind::File, "big", &[7u8; 64])]);
    let mut reader = ArchiveReader::new(Cursor::new(bytes), Limits::new(63, 10)).unwrap();

    let err = reader.next_entry().unwrap_err();

    assert!(matches!(err, ArchiveError::SizeLimitExceeded(_)));
    assert_eq!(reader.decoded_bytes(), 0);
}

#[test]
fn ArchiveReader___declared_entry_count_over_budget___fails_at_open() {
    let bytes = raw_archive(&[
        (EntryKind::File, "a", b""),
        (EntryKind::File, "b", b""),
    ]);

    let result = ArchiveReader::new(Cursor::new(bytes), Limits::new(100, 1));

    assert!(matches!(result, Err(ArchiveError::SizeLimitExceeded(_))));
}

#[test]
fn ArchiveReader___open_missing_file___is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let result = ArchiveReader::open(dir.path().join("absent.satchel"), Limits::default());

    assert!(matches!(result, Err(ArchiveError::SourceNotFound(_))));
}

#[test]
fn ArchiveReader___open_directory___is_source_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let result = ArchiveReader::open(dir.path(), Limits::default());

    assert!(matches!(result, Err(ArchiveError::SourceNotFound(_))));
}

#[test]
fn list___valid_archive___returns_all_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.satchel");
    std::fs::write(
        &path,
        raw_archive(&[
            (EntryKind::Directory, "d", b""),
            (EntryKind::File, "d/f", b"abc"),
            (EntryKind::Symlink, "d/l", b"f"),
        ]),
    )
    .unwrap();

    let entries = list(&path, Limits::default()).unwrap();

    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["d", "d/f", "d/l"]);
    assert_eq!(entries[2].kind, EntryKind::Symlink);
}
