mod backend;
mod format;
mod reader;
mod record;
mod session;
mod writer;

pub use backend::{Access, Backend, FileBackend, MemoryBackend};
pub use format::{
    round_up, EntryType, Header, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, MAX_NAME_LENGTH,
    RECORD_SIZE, TERMINATOR_SIZE,
};
pub use record::{checksum, decode, encode, is_null, RawRecord};
pub(crate) use session::release;
pub use session::{CursorState, OpenMode, Session};
