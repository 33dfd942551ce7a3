use crate::archive::backend::Backend;
use crate::archive::format::{round_up, Header, RECORD_SIZE, TERMINATOR_SIZE};
use crate::archive::record;
use crate::archive::session::{OpenMode, Session};
use crate::error::{Result, TarError};
use tracing::{debug, trace};

const ZERO_RECORD: [u8; RECORD_SIZE] = [0u8; RECORD_SIZE];

/// Entry and payload writes.
///
/// Each entry is a header followed by exactly `size` payload bytes, which may
/// arrive over several `write_data` calls. Padding to the record boundary is
/// written once the last payload byte is in. `finalize` closes the archive
/// with two zero records.
impl<B: Backend> Session<B> {
    /// Write a header record for an arbitrary entry
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.ensure_writable("write_header")?;
        if self.cursor.remaining > 0 {
            return Err(TarError::IncompleteEntry {
                remaining: self.cursor.remaining,
            });
        }
        header.validate()?;

        let raw = record::encode(header);
        self.write_raw(&raw)?;
        self.cursor.remaining = header.size;
        trace!(name = %header.name, size = header.size, kind = ?header.kind, "wrote header");
        Ok(())
    }

    /// Regular file header using the configured file mode
    pub fn write_file_header(&mut self, name: &str, size: u64) -> Result<()> {
        let header = Header::file(name, size, self.config.file_mode);
        self.write_header(&header)
    }

    /// Directory header using the configured directory mode
    pub fn write_dir_header(&mut self, name: &str) -> Result<()> {
        let header = Header::directory(name, self.config.dir_mode);
        self.write_header(&header)
    }

    /// Write payload bytes for the entry whose header was written last
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_writable("write_data")?;
        let len = data.len() as u64;
        if len > self.cursor.remaining {
            return Err(TarError::PayloadOverflow {
                remaining: self.cursor.remaining,
                requested: len,
            });
        }

        self.write_raw(data)?;
        self.cursor.remaining -= len;

        if self.cursor.remaining == 0 {
            let position = self.cursor.position;
            let padding = (round_up(position, RECORD_SIZE as u64) - position) as usize;
            self.write_raw(&ZERO_RECORD[..padding])?;
        }
        Ok(())
    }

    /// Write the two-record terminator. No writes are accepted afterwards.
    pub fn finalize(&mut self) -> Result<()> {
        self.ensure_writable("finalize")?;
        if self.cursor.remaining > 0 {
            return Err(TarError::IncompleteEntry {
                remaining: self.cursor.remaining,
            });
        }

        self.write_raw(&[0u8; TERMINATOR_SIZE])?;
        self.finalized = true;
        debug!(length = self.cursor.position, "finalized archive");
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.mode == OpenMode::Read {
            return Err(TarError::InvalidMode {
                operation,
                mode: self.mode.as_str(),
            });
        }
        if self.finalized {
            return Err(TarError::Finalized);
        }
        Ok(())
    }
}
