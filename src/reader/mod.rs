//! Random-access record extraction over one open file handle
//!
//! An [`IndexedReader`] pairs a parsed [`ContainerIndex`] with exactly one
//! file handle and fetches the exact byte span of any record with a single
//! seek + read. The seek-then-read pair is stateful on the shared stream
//! position, so every fetch takes `&mut self`; two threads can never
//! interleave seeks on one handle without the borrow checker objecting.
//!
//! Workers that want parallel access open one reader each via
//! [`IndexedReader::try_clone`], sharing the immutable index instead of
//! re-parsing the footer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mzrandex::index::RecordKind;
//! use mzrandex::reader::IndexedReader;
//! use mzrandex::record::XmlRecordDecoder;
//!
//! let mut reader = IndexedReader::open("run.mzML")?;
//! let ordinal = reader.ordinal_of(RecordKind::Spectrum, "scan=42")?;
//! let spectrum = reader.read_spectrum(ordinal, &XmlRecordDecoder::new())?;
//! println!("{} peaks", spectrum.peak_count());
//! # Ok::<(), mzrandex::reader::ReaderError>(())
//! ```

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::index::{ContainerIndex, RawRecordSlice, RecordKind};
use crate::record::{Chromatogram, RecordDecoder, Spectrum};

mod error;
mod summary;

#[cfg(test)]
mod tests;

pub use error::ReaderError;
pub use summary::FileSummary;

/// Random-access reader over one indexed container file.
///
/// Owns one file handle; the index is shared and immutable.
#[derive(Debug)]
pub struct IndexedReader {
    path: PathBuf,
    file: File,
    index: Arc<ContainerIndex>,
}

impl IndexedReader {
    /// Open a container and parse its footer index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let index = Arc::new(ContainerIndex::from_reader(&mut file)?);
        log::debug!(
            "opened {}: {} spectra, {} chromatograms",
            path.display(),
            index.count(RecordKind::Spectrum),
            index.count(RecordKind::Chromatogram)
        );
        Ok(Self { path, file, index })
    }

    /// Open a second handle over a container whose index is already parsed.
    pub fn open_with_index<P: AsRef<Path>>(
        path: P,
        index: Arc<ContainerIndex>,
    ) -> Result<Self, ReaderError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self { path, file, index })
    }

    /// Open a fresh handle over the same file, sharing the parsed index.
    ///
    /// This is the supported way to read from multiple threads: one reader,
    /// and therefore one stream position, per worker.
    pub fn try_clone(&self) -> Result<Self, ReaderError> {
        Self::open_with_index(&self.path, Arc::clone(&self.index))
    }

    /// The parsed footer index.
    pub fn index(&self) -> &ContainerIndex {
        &self.index
    }

    /// A shareable handle to the parsed footer index.
    pub fn shared_index(&self) -> Arc<ContainerIndex> {
        Arc::clone(&self.index)
    }

    /// Path this reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records of the given kind. O(1).
    pub fn count(&self, kind: RecordKind) -> usize {
        self.index.count(kind)
    }

    /// Byte range of one record; pure arithmetic over the index.
    pub fn raw_range(&self, kind: RecordKind, ordinal: usize) -> Result<RawRecordSlice, ReaderError> {
        Ok(self.index.raw_range(kind, ordinal)?)
    }

    /// Ordinal of the record with the given native id.
    pub fn ordinal_of(&self, kind: RecordKind, native_id: &str) -> Result<usize, ReaderError> {
        self.index
            .ordinal_of(kind, native_id)
            .ok_or_else(|| ReaderError::IdNotFound {
                kind,
                native_id: native_id.to_string(),
            })
    }

    /// Fetch the bytes of a previously computed range: one seek, one exact
    /// read. Blocking, synchronous I/O.
    pub fn fetch_bytes(&mut self, slice: RawRecordSlice) -> Result<Vec<u8>, ReaderError> {
        self.file.seek(SeekFrom::Start(slice.start))?;
        let mut buf = vec![0u8; slice.len() as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Fetch the raw bytes of one record by ordinal.
    pub fn fetch_record(&mut self, kind: RecordKind, ordinal: usize) -> Result<Vec<u8>, ReaderError> {
        let slice = self.raw_range(kind, ordinal)?;
        self.fetch_bytes(slice)
    }

    /// Fetch the raw bytes of one record by native id.
    pub fn fetch_record_by_id(
        &mut self,
        kind: RecordKind,
        native_id: &str,
    ) -> Result<Vec<u8>, ReaderError> {
        let ordinal = self.ordinal_of(kind, native_id)?;
        self.fetch_record(kind, ordinal)
    }

    /// Fetch and decode one spectrum. Decoder failures propagate unchanged.
    pub fn read_spectrum<D: RecordDecoder>(
        &mut self,
        ordinal: usize,
        decoder: &D,
    ) -> Result<Spectrum, ReaderError> {
        let bytes = self.fetch_record(RecordKind::Spectrum, ordinal)?;
        Ok(decoder.decode_spectrum(&bytes)?)
    }

    /// Fetch and decode one chromatogram.
    pub fn read_chromatogram<D: RecordDecoder>(
        &mut self,
        ordinal: usize,
        decoder: &D,
    ) -> Result<Chromatogram, ReaderError> {
        let bytes = self.fetch_record(RecordKind::Chromatogram, ordinal)?;
        Ok(decoder.decode_chromatogram(&bytes)?)
    }

    /// Snapshot of counts and index bookkeeping for quick inspection.
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            path: self.path.display().to_string(),
            spectrum_count: self.index.count(RecordKind::Spectrum),
            chromatogram_count: self.index.count(RecordKind::Chromatogram),
            index_list_offset: self.index.index_list_offset(),
            spectra_first: self.index.spectra_first(),
        }
    }
}
