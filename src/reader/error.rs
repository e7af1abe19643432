use crate::index::{IndexError, RecordKind};
use crate::record::DecodeError;

/// Errors that can occur while opening or reading an indexed container
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error while opening, seeking, or reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The footer index failed to parse or was queried out of range
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// No record with the requested native id exists in its table
    #[error("no {kind} with native id {native_id:?}")]
    IdNotFound {
        /// Which table was queried
        kind: RecordKind,
        /// The id that was looked up
        native_id: String,
    },

    /// A record decoder rejected the fetched bytes
    #[error("record decode error: {0}")]
    Decode(#[from] DecodeError),
}
