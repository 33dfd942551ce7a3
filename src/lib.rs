//! tarlet: a small sequential tar archive engine
//!
//! Archives use the classic 512-byte fixed header layout: each entry is a
//! header record followed by its payload padded to a record boundary, and the
//! archive ends with two all-zero records. This crate provides:
//! - A pure header codec with checksum validation
//! - A pluggable byte-device backend (file or memory)
//! - A cursor-based session with `find`/`next` navigation
//! - Streaming payload reads and writes, including partial transfers
//! - Append mode that overwrites the terminator of an existing archive
//!
//! # Example
//!
//! ```no_run
//! use tarlet::{OpenMode, Session};
//!
//! // Create an archive
//! let mut tar = Session::open("example.tar", OpenMode::Write)?;
//! tar.write_file_header("hello.txt", 5)?;
//! tar.write_data(b"world")?;
//! tar.finalize()?;
//! tar.close()?;
//!
//! // Read from archive
//! let mut tar = Session::open("example.tar", OpenMode::Read)?;
//! let header = tar.find("hello.txt")?;
//! let data = tar.read_data(header.size as usize)?;
//! assert_eq!(data, b"world");
//! # Ok::<(), tarlet::error::TarError>(())
//! ```

// Core modules
pub mod archive;
pub mod binding;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use archive::{
    decode, encode, round_up, Access, Backend, CursorState, EntryType, FileBackend, Header,
    MemoryBackend, OpenMode, Session, MAX_NAME_LENGTH, RECORD_SIZE, TERMINATOR_SIZE,
};
pub use config::TarConfig;
pub use error::{strerror, ErrorCode, Result, TarError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Ensure core types are accessible
        let _kind = EntryType::Directory;
        let _header = Header::default();
        let _config = TarConfig::default();
    }
}
