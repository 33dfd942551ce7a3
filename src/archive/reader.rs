use crate::archive::backend::Backend;
use crate::archive::format::RECORD_SIZE;
use crate::archive::session::Session;
use crate::error::Result;
use tracing::trace;

/// Payload reads.
///
/// The first read of an entry loads its header from the cursor and steps past
/// it; later reads continue where the previous one stopped. Once the whole
/// payload has been delivered the cursor returns to the entry's header, so
/// `read_header`, `next` and `find` work again without repositioning.
impl<B: Backend> Session<B> {
    /// Read up to `size` payload bytes of the entry at the cursor.
    ///
    /// Reads never go past the declared entry size, so the returned vector can
    /// be shorter than `size` on the last call.
    pub fn read_data(&mut self, size: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; size];
        let read = self.read_data_into(&mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }

    /// Buffer-filling variant of [`Session::read_data`]; returns the byte count
    pub fn read_data_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.cursor.streaming {
            let header = self.read_header()?;
            self.seek_to(self.cursor.position + RECORD_SIZE as u64)?;
            self.cursor.remaining = header.size;
            self.cursor.streaming = true;
            trace!(name = %header.name, size = header.size, "start payload read");
        }

        let len = (buf.len() as u64).min(self.cursor.remaining) as usize;
        self.read_raw(&mut buf[..len])?;
        self.cursor.remaining -= len as u64;

        if self.cursor.remaining == 0 {
            self.cursor.streaming = false;
            self.seek_to(self.cursor.last_header)?;
        }

        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use crate::archive::backend::MemoryBackend;
    use crate::archive::session::{OpenMode, Session};
    use crate::error::TarError;

    fn reader_over(entries: &[(&str, Vec<u8>)]) -> Session<MemoryBackend> {
        let mut writer = Session::from_backend(MemoryBackend::default(), OpenMode::Write).unwrap();
        for (name, data) in entries {
            writer.write_file_header(name, data.len() as u64).unwrap();
            writer.write_data(data).unwrap();
        }
        writer.finalize().unwrap();
        let bytes = writer.into_backend().into_inner();
        Session::from_backend(MemoryBackend::new(bytes), OpenMode::Read).unwrap()
    }

    #[test]
    fn test_full_read_returns_to_header() {
        let mut session = reader_over(&[("data.bin", vec![0xAB; 700])]);
        let data = session.read_data(700).unwrap();
        assert_eq!(data, vec![0xAB; 700]);
        assert_eq!(session.position(), 0);
        assert!(!session.cursor().streaming);
    }

    #[test]
    fn test_partial_reads_match_single_read() {
        let payload: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let mut session = reader_over(&[("p.bin", payload.clone())]);

        let mut joined = session.read_data(500).unwrap();
        assert_eq!(session.cursor().remaining, 500);
        joined.extend(session.read_data(500).unwrap());
        assert_eq!(joined, payload);
        assert_eq!(session.position(), 0);

        assert_eq!(session.read_data(1000).unwrap(), payload);
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_read_is_bounded_by_entry_size() {
        let mut session = reader_over(&[("a", b"abc".to_vec()), ("b", b"def".to_vec())]);
        // Asking for more than the entry holds never reaches padding
        assert_eq!(session.read_data(4096).unwrap(), b"abc");
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_empty_entry_reads_nothing() {
        let mut session = reader_over(&[("empty", Vec::new()), ("next", b"n".to_vec())]);
        assert!(session.read_data(10).unwrap().is_empty());
        assert!(session.read_data(10).unwrap().is_empty());
        assert_eq!(session.position(), 0);
        session.next().unwrap();
        assert_eq!(session.read_data(1).unwrap(), b"n");
    }

    #[test]
    fn test_read_header_mid_stream_returns_to_entry() {
        let mut session = reader_over(&[("a", vec![1; 100])]);
        session.read_data(10).unwrap();
        let header = session.read_header().unwrap();
        assert_eq!(header.name, "a");
        assert_eq!(session.position(), 0);
        // A fresh read starts the entry over
        assert_eq!(session.read_data(100).unwrap(), vec![1; 100]);
    }

    #[test]
    fn test_read_at_end_of_archive() {
        let mut session = reader_over(&[("a", b"x".to_vec())]);
        session.next().unwrap();
        assert!(matches!(session.read_data(1), Err(TarError::NullRecord)));
    }
}
