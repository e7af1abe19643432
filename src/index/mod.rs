//! Footer index parsing and offset-table arithmetic
//!
//! Indexed containers end with an embedded index: a flat list of
//! (native id, byte offset) pairs per record kind, followed by a fixed
//! `<indexListOffset>` marker pointing back at that list. Parsing the last
//! kilobyte of the file is enough to gain O(1) random access to any record,
//! no matter how large the document is.
//!
//! ```text
//! <indexedmzML>
//!   <mzML> ... records ... </mzML>
//!   <indexList count="2">
//!     <index name="spectrum">
//!       <offset idRef="scan=1">4522</offset>
//!       ...
//!     </index>
//!     <index name="chromatogram"> ... </index>
//!   </indexList>
//!   <indexListOffset>1203142</indexListOffset>
//! </indexedmzML>
//! ```
//!
//! The parsed [`ContainerIndex`] is immutable after construction and cheap
//! to share between reader instances. All range computation happens here as
//! pure arithmetic over the offset tables; actual byte fetching lives in
//! [`crate::reader`].

use std::io::{Read, Seek};

mod error;
mod footer;
mod models;


pub use error::IndexError;
pub use models::{OffsetEntry, OffsetTable, RawRecordSlice, RecordKind};

/// Parsed footer index of one container file.
///
/// Holds one offset table per record kind plus the byte offset of the index
/// list itself, which delimits the final record. Immutable after
/// construction; share it across reader instances via `Arc`.
#[derive(Debug, Clone)]
pub struct ContainerIndex {
    spectra: OffsetTable,
    chromatograms: OffsetTable,
    index_list_offset: u64,
    spectra_first: bool,
}

impl ContainerIndex {
    /// Parse the footer index from any seekable byte source.
    ///
    /// Seeks near the end of the stream to find the `<indexListOffset>`
    /// marker, then seeks to the index list and parses it. The stream
    /// position afterwards is unspecified.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self, IndexError> {
        footer::read_container_index(reader)
    }

    /// Assemble an index from already-validated offset tables.
    ///
    /// Checks that no record starts at or past the index list, that the two
    /// kinds' regions do not interleave, and records which kind comes first
    /// in file order.
    pub(crate) fn new(
        spectra: OffsetTable,
        chromatograms: OffsetTable,
        index_list_offset: u64,
    ) -> Result<Self, IndexError> {
        if spectra.is_empty() && chromatograms.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        for table in [&spectra, &chromatograms] {
            if let Some(entry) = table.entries().last() {
                if entry.offset >= index_list_offset {
                    return Err(IndexError::OffsetBeyondIndexList {
                        native_id: entry.native_id.clone(),
                        offset: entry.offset,
                        index_list_offset,
                    });
                }
            }
        }
        // With one table empty the flag is irrelevant: the other kind's last
        // record always ends at the index list.
        let spectra_first = match (spectra.first_offset(), chromatograms.first_offset()) {
            (Some(s), Some(c)) => s < c,
            _ => true,
        };
        // The two regions must not interleave, or the last record of the
        // leading kind would get an end below its own start.
        if !spectra.is_empty() && !chromatograms.is_empty() {
            let (leading_kind, leading, trailing) = if spectra_first {
                (RecordKind::Spectrum, &spectra, &chromatograms)
            } else {
                (RecordKind::Chromatogram, &chromatograms, &spectra)
            };
            if let (Some(last), Some(first)) = (leading.entries().last(), trailing.first_offset()) {
                if last.offset >= first {
                    return Err(IndexError::InterleavedTables {
                        leading: leading_kind,
                        last_offset: last.offset,
                        trailing: leading_kind.other(),
                        first_offset: first,
                    });
                }
            }
        }
        Ok(Self {
            spectra,
            chromatograms,
            index_list_offset,
            spectra_first,
        })
    }

    /// Number of records of the given kind. O(1).
    pub fn count(&self, kind: RecordKind) -> usize {
        self.table(kind).len()
    }

    /// The offset table for one record kind.
    pub fn table(&self, kind: RecordKind) -> &OffsetTable {
        match kind {
            RecordKind::Spectrum => &self.spectra,
            RecordKind::Chromatogram => &self.chromatograms,
        }
    }

    /// Byte offset of the embedded index list.
    pub fn index_list_offset(&self) -> u64 {
        self.index_list_offset
    }

    /// Whether spectra precede chromatograms in file order.
    pub fn spectra_first(&self) -> bool {
        self.spectra_first
    }

    /// Ordinal of the record with the given native id, if present.
    /// O(1) average via the id map built at parse time.
    pub fn ordinal_of(&self, kind: RecordKind, native_id: &str) -> Option<usize> {
        self.table(kind).ordinal_of(native_id)
    }

    /// Native id of the record at the given ordinal, if in range.
    pub fn native_id(&self, kind: RecordKind, ordinal: usize) -> Option<&str> {
        self.table(kind).get(ordinal).map(|e| e.native_id.as_str())
    }

    /// Compute the exact byte range of one record. Pure arithmetic, no I/O.
    ///
    /// A record extends from its own offset to the offset of the next record
    /// of the same kind. The last record of the kind stored later in the
    /// file ends at the index list; the last record of the kind stored
    /// earlier ends at the first offset of the other kind (or at the index
    /// list when the other table is empty).
    ///
    /// An out-of-range ordinal is caller misuse and fails hard; it is never
    /// clamped.
    pub fn raw_range(&self, kind: RecordKind, ordinal: usize) -> Result<RawRecordSlice, IndexError> {
        let table = self.table(kind);
        let entry = table.get(ordinal).ok_or(IndexError::OrdinalOutOfRange {
            kind,
            ordinal,
            count: table.len(),
        })?;
        let end = match table.get(ordinal + 1) {
            Some(next) => next.offset,
            None => {
                let kind_is_first = match kind {
                    RecordKind::Spectrum => self.spectra_first,
                    RecordKind::Chromatogram => !self.spectra_first,
                };
                if kind_is_first {
                    self.table(kind.other())
                        .first_offset()
                        .unwrap_or(self.index_list_offset)
                } else {
                    self.index_list_offset
                }
            }
        };
        Ok(RawRecordSlice {
            start: entry.offset,
            end,
        })
    }
}
