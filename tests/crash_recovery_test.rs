//! Append and crash recovery tests
//!
//! Appending to terminated archives, and recovery appends onto archives whose
//! writer never finalized or which were cut short.

use std::fs::OpenOptions;
use tarlet::{ErrorCode, OpenMode, Session, TarError, TERMINATOR_SIZE};
use tempfile::NamedTempFile;

/// Helper: Truncate file to specified size
fn truncate_file(path: &std::path::Path, new_size: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(new_size).unwrap();
}

/// Helper: Create complete archive for testing
fn create_complete_archive() -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let mut tar = Session::open(temp_file.path(), OpenMode::Write).unwrap();
    for i in 0..10 {
        let data = format!("data{}", i);
        tar.write_file_header(&format!("file{}.txt", i), data.len() as u64)
            .unwrap();
        tar.write_data(data.as_bytes()).unwrap();
    }
    tar.finalize().unwrap();
    tar.close().unwrap();
    temp_file
}

fn names(path: &std::path::Path) -> Vec<String> {
    let mut tar = Session::open(path, OpenMode::Read).unwrap();
    tar.entries().unwrap().into_iter().map(|h| h.name).collect()
}

/// Count all-zero records at the end of the file
fn trailing_zero_records(bytes: &[u8]) -> usize {
    bytes
        .chunks(512)
        .rev()
        .take_while(|chunk| chunk.iter().all(|&b| b == 0))
        .count()
}

#[test]
fn test_append_overwrites_terminator() {
    let temp_file = create_complete_archive();
    let path = temp_file.path();
    let original_len = std::fs::metadata(path).unwrap().len();

    let mut tar = Session::open(path, OpenMode::Append).unwrap();
    assert_eq!(tar.position(), original_len - TERMINATOR_SIZE as u64);
    tar.write_file_header("appended.txt", 8).unwrap();
    tar.write_data(b"appended").unwrap();
    tar.finalize().unwrap();
    tar.close().unwrap();

    let bytes = std::fs::read(path).unwrap();
    assert_eq!(bytes.len() as u64, original_len + 1024);
    assert_eq!(trailing_zero_records(&bytes), 2);

    let listed = names(path);
    assert_eq!(listed.len(), 11);
    assert_eq!(listed.last().unwrap(), "appended.txt");

    let mut tar = Session::open(path, OpenMode::Read).unwrap();
    tar.find("appended.txt").unwrap();
    assert_eq!(tar.read_data(8).unwrap(), b"appended");
    tar.find("file0.txt").unwrap();
    assert_eq!(tar.read_data(5).unwrap(), b"data0");
}

#[test]
fn test_repeated_appends() {
    let temp_file = create_complete_archive();
    let path = temp_file.path();

    for round in 0..3 {
        let mut tar = Session::open(path, OpenMode::Append).unwrap();
        tar.write_dir_header(&format!("round{}/", round)).unwrap();
        tar.finalize().unwrap();
        tar.close().unwrap();
    }

    let bytes = std::fs::read(path).unwrap();
    assert_eq!(trailing_zero_records(&bytes), 2);
    let listed = names(path);
    assert_eq!(&listed[10..], &["round0/", "round1/", "round2/"]);
}

#[test]
fn test_finalize_not_called() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let mut tar = Session::open(path, OpenMode::Write).unwrap();
        tar.write_file_header("file1.txt", 5).unwrap();
        tar.write_data(b"data1").unwrap();
        tar.write_file_header("file2.txt", 5).unwrap();
        tar.write_data(b"data2").unwrap();
        tar.close().unwrap();
    }
    assert_eq!(std::fs::metadata(path).unwrap().len(), 2048);

    // Readable up to the point where the terminator is missing
    let mut tar = Session::open(path, OpenMode::Read).unwrap();
    tar.find("file2.txt").unwrap();
    assert_eq!(tar.read_data(5).unwrap(), b"data2");
    tar.next().unwrap();
    assert!(matches!(tar.read_header(), Err(TarError::ReadFailed(_))));
}

#[test]
fn test_recovery_append_onto_unterminated_archive() {
    let temp_file = create_complete_archive();
    let path = temp_file.path();
    let original_len = std::fs::metadata(path).unwrap().len();
    truncate_file(path, original_len - TERMINATOR_SIZE as u64);

    let mut tar = Session::open(path, OpenMode::Append).unwrap();
    // Append-only reopen; the cursor is not moved
    assert_eq!(tar.position(), 0);
    tar.write_file_header("recovered.txt", 9).unwrap();
    tar.write_data(b"recovered").unwrap();
    tar.finalize().unwrap();
    tar.close().unwrap();

    let bytes = std::fs::read(path).unwrap();
    assert_eq!(bytes.len() as u64, original_len + 1024);
    let listed = names(path);
    assert_eq!(listed.len(), 11);
    assert_eq!(listed.last().unwrap(), "recovered.txt");
}

#[test]
fn test_single_record_archive_is_unterminated() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();
    {
        let mut tar = Session::open(path, OpenMode::Write).unwrap();
        tar.write_dir_header("lonely/").unwrap();
        tar.close().unwrap();
    }
    assert_eq!(std::fs::metadata(path).unwrap().len(), 512);

    // Too short to hold a terminator, so append falls back to recovery mode
    let mut tar = Session::open(path, OpenMode::Append).unwrap();
    tar.write_dir_header("company/").unwrap();
    tar.finalize().unwrap();
    tar.close().unwrap();

    assert_eq!(names(path), vec!["lonely/", "company/"]);
}

#[test]
fn test_truncated_mid_payload() {
    let temp_file = create_complete_archive();
    let path = temp_file.path();
    // Cut inside the payload of the fourth entry
    truncate_file(path, 3 * 1024 + 512 + 2);

    let mut tar = Session::open(path, OpenMode::Read).unwrap();
    assert!(tar.find("file2.txt").is_ok());

    let header = tar.find("file3.txt").unwrap();
    let err = tar.read_data(header.size as usize).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ReadFailed);

    assert!(matches!(tar.entries(), Err(TarError::ReadFailed(_))));
}

#[test]
fn test_archive_with_only_terminator_cannot_be_opened() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();
    {
        let mut tar = Session::open(path, OpenMode::Write).unwrap();
        tar.finalize().unwrap();
        tar.close().unwrap();
    }

    for mode in [OpenMode::Read, OpenMode::Append] {
        assert!(matches!(
            Session::open(path, mode),
            Err(TarError::NullRecord)
        ));
    }
}
