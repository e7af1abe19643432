use super::RecordKind;

/// Errors that can occur while parsing or querying a container index
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// I/O error while seeking or reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the index list XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// UTF-8 encoding error in attribute or text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The `<indexListOffset>` footer marker was not found near end-of-file
    #[error("footer marker <indexListOffset> not found in the last {window} bytes")]
    FooterMarkerMissing {
        /// Size of the tail window that was searched
        window: usize,
    },

    /// The footer marker was present but its value did not parse
    #[error("malformed index list offset {text:?}")]
    MalformedFooter {
        /// The offending text content
        text: String,
    },

    /// The index list offset points past the end of the file
    #[error("index list offset {offset} is beyond the end of the file ({file_size} bytes)")]
    OffsetBeyondEof {
        /// Offset announced by the footer marker
        offset: u64,
        /// Actual file size
        file_size: u64,
    },

    /// A required attribute was missing from an index element
    #[error("missing required attribute {0:?} in index list")]
    MissingAttribute(String),

    /// An `<offset>` element held a value that did not parse as an integer
    #[error("malformed byte offset for record {native_id:?}")]
    MalformedOffset {
        /// Native id of the record whose offset is broken
        native_id: String,
    },

    /// Offsets within one table must strictly increase in file order
    #[error("byte offsets are not strictly increasing at {kind} record {native_id:?}")]
    NonMonotonicOffset {
        /// Which table the violation occurred in
        kind: RecordKind,
        /// Native id of the out-of-order record
        native_id: String,
    },

    /// The same native id appeared twice within one table
    #[error("duplicate native id {native_id:?} in {kind} index")]
    DuplicateNativeId {
        /// Which table the duplicate occurred in
        kind: RecordKind,
        /// The duplicated id
        native_id: String,
    },

    /// A record claims to start at or after the index list
    #[error("record {native_id:?} starts at byte {offset}, at or after the index list at {index_list_offset}")]
    OffsetBeyondIndexList {
        /// Native id of the offending record
        native_id: String,
        /// Its claimed start offset
        offset: u64,
        /// Byte offset of the index list
        index_list_offset: u64,
    },

    /// The spectrum and chromatogram regions interleave in file order
    #[error("last {leading} record at byte {last_offset} lies at or after the first {trailing} record at byte {first_offset}")]
    InterleavedTables {
        /// The kind whose table starts first in the file
        leading: RecordKind,
        /// Start offset of the leading kind's last record
        last_offset: u64,
        /// The kind whose table starts later in the file
        trailing: RecordKind,
        /// Start offset of the trailing kind's first record
        first_offset: u64,
    },

    /// The index list contained no spectrum or chromatogram offsets at all
    #[error("empty index list: no spectrum or chromatogram offsets")]
    EmptyIndex,

    /// Ordinal outside `0..count` for the given table; signals caller misuse
    #[error("{kind} ordinal {ordinal} out of range (count {count})")]
    OrdinalOutOfRange {
        /// Which table was queried
        kind: RecordKind,
        /// The requested ordinal
        ordinal: usize,
        /// Number of entries in that table
        count: usize,
    },
}
