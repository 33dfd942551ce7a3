//! Byte devices an archive session can run on.
//!
//! A session only ever needs five operations from its device, captured by
//! [`Backend`]. [`FileBackend`] targets a file on disk; [`MemoryBackend`]
//! keeps the whole archive in a `Vec<u8>`.

use crate::error::{Result, TarError};
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Sequential, seekable byte device
pub trait Backend {
    /// Fill `buf` completely or fail with [`TarError::ReadFailed`]
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write all of `data` or fail with [`TarError::WriteFailed`]
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Move the device position; whence is carried by [`SeekFrom`]
    fn seek(&mut self, pos: SeekFrom) -> Result<()>;

    /// Current device position
    fn tell(&mut self) -> Result<u64>;

    /// Release the device
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// How a file backend is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Existing file, read only
    Read,
    /// Existing file, read and overwrite in place
    ReadWrite,
    /// Create or truncate, then write
    Create,
    /// Existing file, every write lands at the end
    Append,
}

/// Backend over a file on disk
#[derive(Debug)]
pub struct FileBackend {
    file: File,
    path: PathBuf,
}

impl FileBackend {
    pub fn open<P: AsRef<Path>>(path: P, access: Access) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        match access {
            Access::Read => options.read(true),
            Access::ReadWrite => options.read(true).write(true),
            Access::Create => options.read(true).write(true).create(true).truncate(true),
            Access::Append => options.read(true).append(true),
        };

        let file = options.open(path).map_err(|source| TarError::OpenFailed {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.file.read_exact(buf).map_err(TarError::ReadFailed)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data).map_err(TarError::WriteFailed)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<()> {
        self.file.seek(pos).map(|_| ()).map_err(TarError::SeekFailed)
    }

    fn tell(&mut self) -> Result<u64> {
        self.file.stream_position().map_err(TarError::SeekFailed)
    }

    fn close(mut self) -> Result<()> {
        self.file.flush().map_err(TarError::WriteFailed)
    }
}

/// Backend over an in-memory buffer
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Cursor<Vec<u8>>,
}

impl MemoryBackend {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(bytes),
        }
    }

    pub fn get_ref(&self) -> &[u8] {
        self.inner.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl Backend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(TarError::ReadFailed)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).map_err(TarError::WriteFailed)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<()> {
        self.inner.seek(pos).map(|_| ()).map_err(TarError::SeekFailed)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.position())
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}
