//! Multi-reader tests
//!
//! Sessions share nothing, so independent sessions on the same file can run
//! on separate threads. A single session shared between threads needs an
//! outside lock.

use std::sync::{Arc, Mutex};
use std::thread;
use tarlet::{MemoryBackend, OpenMode, Session};
use tempfile::NamedTempFile;

/// Helper: Create archive with N files
fn create_archive_with_files(file_count: usize) -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let mut tar = Session::open(temp_file.path(), OpenMode::Write).unwrap();
    for i in 0..file_count {
        let data = format!("data{}", i).repeat(i + 1);
        tar.write_file_header(&format!("file{}.txt", i), data.len() as u64)
            .unwrap();
        tar.write_data(data.as_bytes()).unwrap();
    }
    tar.finalize().unwrap();
    tar.close().unwrap();
    temp_file
}

#[test]
fn test_independent_sessions_on_threads() {
    let temp_file = create_archive_with_files(50);
    let path = temp_file.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let path = path.clone();
            thread::spawn(move || {
                let mut tar = Session::open(&path, OpenMode::Read).unwrap();
                for i in (t..50).step_by(8) {
                    let header = tar.find(&format!("file{}.txt", i)).unwrap();
                    let data = tar.read_data(header.size as usize).unwrap();
                    assert_eq!(data, format!("data{}", i).repeat(i + 1).as_bytes());
                }
                tar.close().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_shared_session_behind_mutex() {
    let temp_file = create_archive_with_files(20);
    let tar = Session::open(temp_file.path(), OpenMode::Read).unwrap();
    let shared = Arc::new(Mutex::new(tar));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in (t..20).step_by(4) {
                    // find + read must happen under one lock to keep the cursor consistent
                    let mut tar = shared.lock().unwrap();
                    let header = tar.find(&format!("file{}.txt", i)).unwrap();
                    let data = tar.read_data(header.size as usize).unwrap();
                    assert_eq!(data.len() as u64, header.size);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_memory_sessions_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                let mut tar = Session::from_backend(MemoryBackend::default(), OpenMode::Write).unwrap();
                let name = format!("thread{}.bin", t);
                tar.write_file_header(&name, 600).unwrap();
                tar.write_data(&[t as u8; 600]).unwrap();
                tar.finalize().unwrap();

                let bytes = tar.into_backend().into_inner();
                let mut tar = Session::from_backend(MemoryBackend::new(bytes), OpenMode::Read).unwrap();
                tar.find(&name).unwrap();
                assert_eq!(tar.read_data(600).unwrap(), vec![t as u8; 600]);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
