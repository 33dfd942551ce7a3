use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for tar operations
pub type Result<T> = std::result::Result<T, TarError>;

/// Unified error type for all tar operations
#[derive(Debug, Error)]
pub enum TarError {
    // Backend errors
    #[error("could not open {path}")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("could not read")]
    ReadFailed(#[source] io::Error),

    #[error("could not write")]
    WriteFailed(#[source] io::Error),

    #[error("could not seek")]
    SeekFailed(#[source] io::Error),

    // Record errors
    #[error("bad checksum: expected {expected:o}, computed {actual:o}")]
    BadChecksum { expected: u32, actual: u32 },

    /// The record is all zero; at a header position this marks the end of the archive.
    #[error("null record")]
    NullRecord,

    #[error("file not found: {0}")]
    NotFound(String),

    /// A stored name is not UTF-8. The raw field bytes, up to the first NUL, are kept.
    #[error("{field} is not valid UTF-8")]
    InvalidName { field: &'static str, bytes: Vec<u8> },

    // Caller errors
    #[error("name too long: {0} bytes (max 99)")]
    NameTooLong(usize),

    #[error("{field} value {value} does not fit its octal field")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("{operation} is not allowed on a session opened for {mode}")]
    InvalidMode {
        operation: &'static str,
        mode: &'static str,
    },

    #[error("payload overflow: {requested} bytes written with {remaining} remaining")]
    PayloadOverflow { remaining: u64, requested: u64 },

    #[error("entry incomplete: {remaining} payload bytes still expected")]
    IncompleteEntry { remaining: u64 },

    #[error("archive already finalized")]
    Finalized,

    #[error("invalid open mode: {0}")]
    InvalidOpenMode(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl TarError {
    /// Numeric status code reported to the binding layer
    pub fn code(&self) -> ErrorCode {
        match self {
            TarError::OpenFailed { .. } => ErrorCode::OpenFailed,
            TarError::ReadFailed(_) => ErrorCode::ReadFailed,
            TarError::WriteFailed(_) => ErrorCode::WriteFailed,
            TarError::SeekFailed(_) => ErrorCode::SeekFailed,
            TarError::BadChecksum { .. } => ErrorCode::BadChecksum,
            TarError::NullRecord => ErrorCode::NullRecord,
            TarError::NotFound(_) => ErrorCode::NotFound,
            TarError::NameTooLong(_)
            | TarError::InvalidName { .. }
            | TarError::FieldOverflow { .. }
            | TarError::InvalidMode { .. }
            | TarError::PayloadOverflow { .. }
            | TarError::IncompleteEntry { .. }
            | TarError::Finalized
            | TarError::InvalidOpenMode(_)
            | TarError::Config(_) => ErrorCode::Failure,
        }
    }
}

impl From<toml::de::Error> for TarError {
    fn from(err: toml::de::Error) -> Self {
        TarError::Config(err.to_string())
    }
}

/// Status codes shared with the host binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    Failure = -1,
    OpenFailed = -2,
    ReadFailed = -3,
    WriteFailed = -4,
    SeekFailed = -5,
    BadChecksum = -6,
    NullRecord = -7,
    NotFound = -8,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::Success,
        ErrorCode::Failure,
        ErrorCode::OpenFailed,
        ErrorCode::ReadFailed,
        ErrorCode::WriteFailed,
        ErrorCode::SeekFailed,
        ErrorCode::BadChecksum,
        ErrorCode::NullRecord,
        ErrorCode::NotFound,
    ];

    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| *code as i32 == value)
    }

    /// Fixed human-readable text for this code
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::Failure => "failure",
            ErrorCode::OpenFailed => "could not open",
            ErrorCode::ReadFailed => "could not read",
            ErrorCode::WriteFailed => "could not write",
            ErrorCode::SeekFailed => "could not seek",
            ErrorCode::BadChecksum => "bad checksum",
            ErrorCode::NullRecord => "null record",
            ErrorCode::NotFound => "file not found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Message for a raw status code, `"unknown error"` for codes outside the table
pub fn strerror(code: i32) -> &'static str {
    ErrorCode::from_i32(code).map_or("unknown error", ErrorCode::message)
}
