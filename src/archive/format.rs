use crate::error::{Result, TarError};

/// Size of one header record and the payload alignment unit
pub const RECORD_SIZE: usize = 512;

/// Two all-zero records close every archive
pub const TERMINATOR_SIZE: usize = RECORD_SIZE * 2;

/// Maximum name/linkname length in bytes (the field also holds a NUL terminator)
pub const MAX_NAME_LENGTH: usize = 99;

/// Default permission bits for regular files
pub const DEFAULT_FILE_MODE: u32 = 0o664;

/// Default permission bits for directories
pub const DEFAULT_DIR_MODE: u32 = 0o775;

// Largest values whose octal digits still leave room for a NUL in their field
const MAX_MODE: u64 = 0o7777777;
const MAX_LARGE: u64 = 0o77777777777;

/// Round `n` up to the next multiple of `incr`
pub fn round_up(n: u64, incr: u64) -> u64 {
    n + (incr - n % incr) % incr
}

/// Entry type stored in the single type byte of a header record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryType {
    #[default]
    Regular,
    HardLink,
    Symlink,
    CharDevice,
    BlockDevice,
    Directory,
    Fifo,
    /// Any type byte outside the classic set, kept verbatim
    Other(u8),
}

impl EntryType {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 | b'0' => Self::Regular,
            b'1' => Self::HardLink,
            b'2' => Self::Symlink,
            b'3' => Self::CharDevice,
            b'4' => Self::BlockDevice,
            b'5' => Self::Directory,
            b'6' => Self::Fifo,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Regular => b'0',
            Self::HardLink => b'1',
            Self::Symlink => b'2',
            Self::CharDevice => b'3',
            Self::BlockDevice => b'4',
            Self::Directory => b'5',
            Self::Fifo => b'6',
            // An unset type byte is written as a regular file
            Self::Other(0) => b'0',
            Self::Other(other) => other,
        }
    }
}

/// Decoded form of one entry header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub name: String,
    pub mode: u32,
    pub owner: u32,
    pub size: u64,
    pub mtime: u64,
    pub kind: EntryType,
    pub linkname: String,
}

impl Header {
    /// Regular file header with the given permission bits
    pub fn file(name: &str, size: u64, mode: u32) -> Self {
        Self {
            name: name.to_string(),
            mode,
            size,
            kind: EntryType::Regular,
            ..Self::default()
        }
    }

    /// Directory header; directories never carry a payload
    pub fn directory(name: &str, mode: u32) -> Self {
        Self {
            name: name.to_string(),
            mode,
            size: 0,
            kind: EntryType::Directory,
            ..Self::default()
        }
    }

    /// Number of bytes this entry occupies in the archive, header included
    pub fn record_len(&self) -> u64 {
        round_up(self.size, RECORD_SIZE as u64) + RECORD_SIZE as u64
    }

    /// Check that every field fits its slot in the raw record.
    ///
    /// Encoding itself never fails; oversized values are truncated there, so
    /// writers call this first.
    pub fn validate(&self) -> Result<()> {
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(TarError::NameTooLong(self.name.len()));
        }
        if self.linkname.len() > MAX_NAME_LENGTH {
            return Err(TarError::NameTooLong(self.linkname.len()));
        }
        check_field("mode", self.mode as u64, MAX_MODE)?;
        check_field("owner", self.owner as u64, MAX_MODE)?;
        check_field("size", self.size, MAX_LARGE)?;
        check_field("mtime", self.mtime, MAX_LARGE)?;
        Ok(())
    }
}

fn check_field(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(TarError::FieldOverflow { field, value });
    }
    Ok(())
}
