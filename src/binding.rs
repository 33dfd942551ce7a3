//! Call contract for a host scripting runtime.
//!
//! Every call either succeeds or returns a [`CallError`]: a numeric status
//! code plus the fixed message for that code. Headers are handed over as
//! [`HeaderFields`], a flat record the host can turn into its own table type.
//!
//! ```no_run
//! use tarlet::binding;
//!
//! let mut tar = binding::open("backup.tar", "w")?;
//! tar.write_file_header("hello.txt", 5)?;
//! tar.write_data(b"world")?;
//! tar.close()?;
//! # Ok::<(), tarlet::binding::CallError>(())
//! ```

use crate::archive::{release, EntryType, FileBackend, Header, OpenMode, Session};
use crate::config::TarConfig;
use crate::error::{ErrorCode, TarError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const VERSION: &str = concat!("tarlet ", env!("CARGO_PKG_VERSION"));
pub const DESCRIPTION: &str = "tarlet binding is a thin wrapper over the tarlet archive engine";

/// Names the host exposes as constants: entry types, then status codes
pub const CONSTANTS: &[(&str, i32)] = &[
    ("TREG", b'0' as i32),
    ("TLNK", b'1' as i32),
    ("TSYM", b'2' as i32),
    ("TCHR", b'3' as i32),
    ("TBLK", b'4' as i32),
    ("TDIR", b'5' as i32),
    ("TFIFO", b'6' as i32),
    ("ESUCCESS", ErrorCode::Success as i32),
    ("EFAILURE", ErrorCode::Failure as i32),
    ("EOPENFAIL", ErrorCode::OpenFailed as i32),
    ("EREADFAIL", ErrorCode::ReadFailed as i32),
    ("EWRITEFAIL", ErrorCode::WriteFailed as i32),
    ("ESEEKFAIL", ErrorCode::SeekFailed as i32),
    ("EBADCHKSUM", ErrorCode::BadChecksum as i32),
    ("ENULLRECORD", ErrorCode::NullRecord as i32),
    ("ENOTFOUND", ErrorCode::NotFound as i32),
];

const STATUS_OK: i32 = ErrorCode::Success as i32;

/// Failed call: status code and its fixed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({code})")]
pub struct CallError {
    pub code: i32,
    pub message: &'static str,
}

impl CallError {
    fn closed() -> Self {
        ErrorCode::Failure.into()
    }
}

impl From<ErrorCode> for CallError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code: code as i32,
            message: code.message(),
        }
    }
}

impl From<TarError> for CallError {
    fn from(err: TarError) -> Self {
        debug!(error = %err, "call failed");
        err.code().into()
    }
}

pub type CallResult<T> = std::result::Result<T, CallError>;

/// Header as seen by the host; `type` is the raw type byte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFields {
    pub mode: u32,
    pub owner: u32,
    pub size: u64,
    pub mtime: u64,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub linkname: String,
}

impl HeaderFields {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.mode,
            "owner": self.owner,
            "size": self.size,
            "mtime": self.mtime,
            "type": self.kind,
            "name": self.name,
            "linkname": self.linkname,
        })
    }

    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.kind)
    }
}

impl From<Header> for HeaderFields {
    fn from(header: Header) -> Self {
        Self {
            mode: header.mode,
            owner: header.owner,
            size: header.size,
            mtime: header.mtime,
            kind: header.kind.as_byte(),
            name: header.name,
            linkname: header.linkname,
        }
    }
}

/// Open an archive; `mode` is `"r"`, `"w"` or `"a"`
pub fn open(path: &str, mode: &str) -> CallResult<Handle> {
    open_with_config(path, mode, TarConfig::default())
}

pub fn open_with_config(path: &str, mode: &str, config: TarConfig) -> CallResult<Handle> {
    let mode: OpenMode = mode.parse()?;
    let session = Session::open(path, mode)?.with_config(config.clone());
    Ok(Handle {
        session: Some(session),
        config,
    })
}

/// Host-owned archive handle.
///
/// Dropping an open handle closes it, the way a garbage-collected host
/// object would be finalized.
#[derive(Debug)]
pub struct Handle {
    session: Option<Session<FileBackend>>,
    config: TarConfig,
}

impl Handle {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn session(&mut self) -> CallResult<&mut Session<FileBackend>> {
        self.session.as_mut().ok_or_else(CallError::closed)
    }

    /// Close the handle, writing the terminator first for write and append
    /// handles. The backend is released even when finalizing fails.
    pub fn close(&mut self) -> CallResult<i32> {
        let mut session = self.session.take().ok_or_else(CallError::closed)?;
        if session.mode() != OpenMode::Read && !session.is_finalized() {
            if let Err(err) = session.finalize() {
                release(session.into_backend());
                return Err(err.into());
            }
        }
        session.close()?;
        Ok(STATUS_OK)
    }

    pub fn write_file_header(&mut self, name: &str, size: u64) -> CallResult<i32> {
        self.session()?.write_file_header(name, size)?;
        Ok(STATUS_OK)
    }

    pub fn write_dir_header(&mut self, name: &str) -> CallResult<i32> {
        self.session()?.write_dir_header(name)?;
        Ok(STATUS_OK)
    }

    pub fn write_data(&mut self, data: &[u8]) -> CallResult<i32> {
        self.session()?.write_data(data)?;
        Ok(STATUS_OK)
    }

    pub fn next(&mut self) -> CallResult<i32> {
        self.session()?.next()?;
        Ok(STATUS_OK)
    }

    /// Header of the entry named exactly `name`
    pub fn find(&mut self, name: &str) -> CallResult<HeaderFields> {
        let header = self.session()?.find(name)?;
        Ok(header.into())
    }

    /// Header at the cursor, with a leading `./` removed from the name
    pub fn read_header(&mut self) -> CallResult<HeaderFields> {
        let strip = self.config.strip_cwd_prefix;
        let mut fields: HeaderFields = self.session()?.read_header()?.into();
        if strip {
            if let Some(stripped) = fields.name.strip_prefix("./") {
                fields.name = stripped.to_string();
            }
        }
        Ok(fields)
    }

    pub fn read_data(&mut self, size: usize) -> CallResult<Vec<u8>> {
        Ok(self.session()?.read_data(size)?)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}
