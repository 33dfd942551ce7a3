use crate::archive::backend::{Access, Backend, FileBackend};
use crate::archive::format::{Header, RECORD_SIZE, TERMINATOR_SIZE};
use crate::archive::record::{self, RawRecord};
use crate::config::TarConfig;
use crate::error::{Result, TarError};
use std::fmt;
use std::io::SeekFrom;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Mode a session is opened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OpenMode::Read => "read",
            OpenMode::Write => "write",
            OpenMode::Append => "append",
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = TarError;

    /// Accepts `"r"`, `"w"` and `"a"`, optionally followed by `b`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" | "rb" => Ok(OpenMode::Read),
            "w" | "wb" => Ok(OpenMode::Write),
            "a" | "ab" => Ok(OpenMode::Append),
            other => Err(TarError::InvalidOpenMode(other.to_string())),
        }
    }
}

/// Positional state of a session.
///
/// `position` mirrors the backend offset and is only ever updated
/// arithmetically; the backend is asked for its position at open time only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Absolute byte offset of the next operation
    pub position: u64,
    /// Offset of the most recently read header
    pub last_header: u64,
    /// Payload bytes of the current entry not yet read or written
    pub remaining: u64,
    /// A payload read is in progress
    pub streaming: bool,
}

/// How the archive ends, as found when opening for read or append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Terminated,
    Unterminated,
}

/// A cursor over one tar archive, bound to the backend it exclusively owns
pub struct Session<B: Backend> {
    pub(crate) backend: B,
    pub(crate) cursor: CursorState,
    pub(crate) mode: OpenMode,
    pub(crate) finalized: bool,
    pub(crate) config: TarConfig,
}

impl Session<FileBackend> {
    /// Open an archive file.
    ///
    /// `Write` creates or truncates the file. `Read` and `Append` require a
    /// valid first header. A properly terminated archive opened for append is
    /// positioned over its terminator so new entries overwrite it; an
    /// unterminated one is reopened append-only, which allows recovery
    /// appends onto damaged archives.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();

        if mode == OpenMode::Write {
            let backend = FileBackend::open(path, Access::Create)?;
            debug!(path = %path.display(), "created archive");
            return Ok(Self::new(backend, mode, 0));
        }

        let mut backend = FileBackend::open(path, Access::Read)?;
        let framing = match probe(&mut backend) {
            Ok(framing) => framing,
            Err(err) => {
                release(backend);
                return Err(err);
            }
        };
        debug!(path = %path.display(), %mode, ?framing, "validated archive");

        match (mode, framing) {
            (OpenMode::Append, Framing::Terminated) => {
                backend.close()?;
                let mut backend = FileBackend::open(path, Access::ReadWrite)?;
                let position = match seek_to_terminator(&mut backend) {
                    Ok(position) => position,
                    Err(err) => {
                        release(backend);
                        return Err(err);
                    }
                };
                Ok(Self::new(backend, mode, position))
            }
            (OpenMode::Append, Framing::Unterminated) => {
                warn!(path = %path.display(), "archive is not terminated, appending at end of file");
                backend.close()?;
                let backend = FileBackend::open(path, Access::Append)?;
                Ok(Self::new(backend, mode, 0))
            }
            _ => {
                if let Err(err) = backend.seek(SeekFrom::Start(0)) {
                    release(backend);
                    return Err(err);
                }
                Ok(Self::new(backend, mode, 0))
            }
        }
    }
}

impl<B: Backend> Session<B> {
    fn new(backend: B, mode: OpenMode, position: u64) -> Self {
        Self {
            backend,
            cursor: CursorState {
                position,
                ..CursorState::default()
            },
            mode,
            finalized: false,
            config: TarConfig::default(),
        }
    }

    /// Run the open-time validation on a backend that is already open.
    ///
    /// `Write` uses the backend as is. For `Read` and `Append` the same
    /// framing checks as [`Session::open`] apply. Since the backend cannot be
    /// reopened append-only, an unterminated archive opened for append gets
    /// its cursor moved to the end of the data instead.
    pub fn from_backend(mut backend: B, mode: OpenMode) -> Result<Self> {
        if mode == OpenMode::Write {
            return Ok(Self::new(backend, mode, 0));
        }

        let framing = match probe(&mut backend) {
            Ok(framing) => framing,
            Err(err) => {
                release(backend);
                return Err(err);
            }
        };
        debug!(%mode, ?framing, "validated archive");

        let position = match (mode, framing) {
            (OpenMode::Append, Framing::Terminated) => seek_to_terminator(&mut backend),
            (OpenMode::Append, Framing::Unterminated) => {
                warn!("archive is not terminated, appending at end of data");
                backend
                    .seek(SeekFrom::End(0))
                    .and_then(|_| backend.tell())
            }
            _ => backend.seek(SeekFrom::Start(0)).map(|_| 0),
        };

        match position {
            Ok(position) => Ok(Self::new(backend, mode, position)),
            Err(err) => {
                release(backend);
                Err(err)
            }
        }
    }

    /// Replace the entry defaults used by the convenience writers
    pub fn with_config(mut self, config: TarConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TarConfig {
        &self.config
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn position(&self) -> u64 {
        self.cursor.position
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Give up the session and hand back its backend without closing it
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Release the backend. Does not finalize; see [`Session::finalize`].
    pub fn close(self) -> Result<()> {
        debug!(mode = %self.mode, position = self.cursor.position, "closing session");
        self.backend.close()
    }

    /// Return to the start of the archive and forget any entry in progress
    pub fn rewind(&mut self) -> Result<()> {
        self.cursor.remaining = 0;
        self.cursor.last_header = 0;
        self.cursor.streaming = false;
        self.seek_to(0)
    }

    /// Absolute seek.
    ///
    /// A payload read in progress is dropped, so the next `read_header` reads
    /// at `pos`.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if self.cursor.streaming {
            self.cursor.streaming = false;
            self.cursor.remaining = 0;
        }
        self.seek_to(pos)
    }

    /// Move the backend and the mirrored position, leaving stream state alone
    pub(crate) fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.backend.seek(SeekFrom::Start(pos))?;
        trace!(from = self.cursor.position, to = pos, "seek");
        self.cursor.position = pos;
        Ok(())
    }

    /// Read the header at the cursor without consuming it.
    ///
    /// The cursor is left on the header, so a following `read_data`, `next`
    /// or another `read_header` starts at the same offset. A read still in
    /// progress is abandoned and the cursor returns to that entry's header
    /// first.
    pub fn read_header(&mut self) -> Result<Header> {
        if self.cursor.streaming {
            self.abandon_stream()?;
        }

        self.cursor.last_header = self.cursor.position;
        let mut raw: RawRecord = [0u8; RECORD_SIZE];
        self.read_raw(&mut raw)?;
        self.seek_to(self.cursor.last_header)?;
        record::decode(&raw)
    }

    /// Skip the entry at the cursor, payload and padding included
    pub fn next(&mut self) -> Result<()> {
        let header = self.read_header()?;
        self.seek_to(self.cursor.position + header.record_len())
    }

    /// Scan from the start of the archive for an entry named `name`.
    ///
    /// On success the cursor rests on the matching header. Reaching the end
    /// of the archive yields [`TarError::NotFound`].
    pub fn find(&mut self, name: &str) -> Result<Header> {
        self.rewind()?;
        loop {
            match self.read_header() {
                Ok(header) if header.name == name => return Ok(header),
                Ok(header) => self.seek_to(self.cursor.position + header.record_len())?,
                Err(TarError::NullRecord) => return Err(TarError::NotFound(name.to_string())),
                Err(err) => return Err(err),
            }
        }
    }

    /// Every header in the archive, in order. The cursor is rewound afterwards.
    pub fn entries(&mut self) -> Result<Vec<Header>> {
        self.rewind()?;
        let mut headers = Vec::new();
        loop {
            match self.read_header() {
                Ok(header) => {
                    self.seek_to(self.cursor.position + header.record_len())?;
                    headers.push(header);
                }
                Err(TarError::NullRecord) => break,
                Err(err) => return Err(err),
            }
        }
        self.rewind()?;
        Ok(headers)
    }

    fn abandon_stream(&mut self) -> Result<()> {
        trace!(remaining = self.cursor.remaining, "abandoning payload read");
        self.cursor.streaming = false;
        self.cursor.remaining = 0;
        self.seek_to(self.cursor.last_header)
    }

    pub(crate) fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        self.backend.read(buf)?;
        self.cursor.position += buf.len() as u64;
        Ok(())
    }

    pub(crate) fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.backend.write(data)?;
        self.cursor.position += data.len() as u64;
        Ok(())
    }
}

impl<B: Backend> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("cursor", &self.cursor)
            .field("finalized", &self.finalized)
            .finish()
    }
}

/// Check the first header and look for the two-record terminator
fn probe<B: Backend>(backend: &mut B) -> Result<Framing> {
    let mut first: RawRecord = [0u8; RECORD_SIZE];
    backend.seek(SeekFrom::Start(0))?;
    backend.read(&mut first)?;
    record::decode(&first)?;

    // Too short to hold a terminator
    if backend.seek(SeekFrom::End(-(TERMINATOR_SIZE as i64))).is_err() {
        return Ok(Framing::Unterminated);
    }

    let mut tail = [0u8; TERMINATOR_SIZE];
    backend.read(&mut tail)?;
    if tail.iter().all(|&b| b == 0) {
        Ok(Framing::Terminated)
    } else {
        Ok(Framing::Unterminated)
    }
}

fn seek_to_terminator<B: Backend>(backend: &mut B) -> Result<u64> {
    backend.seek(SeekFrom::End(-(TERMINATOR_SIZE as i64)))?;
    backend.tell()
}

/// Close a backend on an error path; the original error wins over a close failure
pub(crate) fn release<B: Backend>(backend: B) {
    if let Err(err) = backend.close() {
        warn!(error = %err, "failed to release backend after error");
    }
}
