//! Offset-table data model shared by the index parser and the reader

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::IndexError;

/// The two record namespaces of a container file.
///
/// Spectrum and chromatogram ids live in separate tables; the same native id
/// may legally appear once in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A mass spectrum record
    Spectrum,
    /// A chromatogram record
    Chromatogram,
}

impl RecordKind {
    /// The other record kind.
    pub fn other(self) -> Self {
        match self {
            RecordKind::Spectrum => RecordKind::Chromatogram,
            RecordKind::Chromatogram => RecordKind::Spectrum,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Spectrum => write!(f, "spectrum"),
            RecordKind::Chromatogram => write!(f, "chromatogram"),
        }
    }
}

/// One (native id, byte offset) pair from the index list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetEntry {
    /// Format-defined id uniquely identifying the record within its table
    pub native_id: String,
    /// Byte offset of the record's opening tag
    pub offset: u64,
}

/// Ordered offset entries for one record kind, in file order, plus a derived
/// id-to-ordinal map built once at parse time.
///
/// Invariant: offsets strictly increase with table position, because entries
/// mirror the physical file layout.
#[derive(Debug, Clone, Default)]
pub struct OffsetTable {
    entries: Vec<OffsetEntry>,
    by_id: HashMap<String, usize>,
}

impl OffsetTable {
    /// Build a table from entries in file order, validating monotonicity and
    /// id uniqueness.
    pub(crate) fn from_entries(
        kind: RecordKind,
        entries: Vec<OffsetEntry>,
    ) -> Result<Self, IndexError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut prev_offset: Option<u64> = None;
        for (ordinal, entry) in entries.iter().enumerate() {
            if let Some(prev) = prev_offset {
                if entry.offset <= prev {
                    return Err(IndexError::NonMonotonicOffset {
                        kind,
                        native_id: entry.native_id.clone(),
                    });
                }
            }
            prev_offset = Some(entry.offset);
            if by_id.insert(entry.native_id.clone(), ordinal).is_some() {
                return Err(IndexError::DuplicateNativeId {
                    kind,
                    native_id: entry.native_id.clone(),
                });
            }
        }
        Ok(Self { entries, by_id })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at the given table position.
    pub fn get(&self, ordinal: usize) -> Option<&OffsetEntry> {
        self.entries.get(ordinal)
    }

    /// Table position of the entry with the given native id.
    pub fn ordinal_of(&self, native_id: &str) -> Option<usize> {
        self.by_id.get(native_id).copied()
    }

    /// Byte offset of the first entry, if any.
    pub fn first_offset(&self) -> Option<u64> {
        self.entries.first().map(|e| e.offset)
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }
}

/// Half-open byte range `[start, end)` of one record in the file, including
/// its opening and closing tags.
///
/// Computed on demand from the offset tables and never cached; ranges are
/// cheap to recompute while the file stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecordSlice {
    /// First byte of the record
    pub start: u64,
    /// One past the last byte of the record
    pub end: u64,
}

impl RawRecordSlice {
    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}
