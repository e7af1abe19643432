//! # mzrandex - Indexed Random Access for Mass Spectrometry Containers
//!
//! `mzrandex` provides O(1) random access to individual spectra and
//! chromatograms in multi-gigabyte indexed containers (indexed mzML and
//! compatible formats), without parsing the whole document, plus the
//! in-memory scan/peak index structures that feature detection and mass
//! calibration algorithms are built on.
//!
//! ## Key Features
//!
//! - **Footer index parsing**: locates the trailing `<indexListOffset>`
//!   marker, reads the embedded index list, and turns it into validated
//!   per-kind offset tables. Structural problems surface as typed errors,
//!   never as a silently unusable index.
//!
//! - **Exact byte-range extraction**: given an ordinal or a native id, the
//!   reader computes the precise byte span of one record and fetches it with
//!   a single seek + read. Range arithmetic is pure and independently
//!   testable; I/O requires `&mut` access so interleaved seeks on a shared
//!   handle are ruled out at compile time.
//!
//! - **Scan-rank indexing**: maps any retention time to a scan ordinal in
//!   O(log s) and finds the peak nearest to a query m/z inside a scan,
//!   including the neighbor-correction step that plain lower-bound search
//!   misses on centroided data.
//!
//! - **Calibration consumer**: linear and quadratic mass-correction models
//!   fitted globally or per scan, demonstrating how algorithms consume the
//!   rank index and the random-access reader.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzrandex::prelude::*;
//!
//! // Open an indexed container; the footer index is parsed once.
//! let mut reader = IndexedReader::open("run.mzML")?;
//! println!("{} spectra", reader.count(RecordKind::Spectrum));
//!
//! // Fetch and decode one spectrum by ordinal.
//! let decoder = XmlRecordDecoder::new();
//! let spectrum = reader.read_spectrum(0, &decoder)?;
//! println!("{} peaks at RT {:?}", spectrum.peak_count(), spectrum.retention_time);
//! # Ok::<(), mzrandex::reader::ReaderError>(())
//! ```
//!
//! ## Scan-rank queries
//!
//! ```rust
//! use mzrandex::record::Peak;
//! use mzrandex::scan::{NearestPeak, ScanRankIndex};
//!
//! let peaks = vec![
//!     Peak::new(1.0, 100.0, 500.0),
//!     Peak::new(1.0, 200.0, 600.0),
//!     Peak::new(2.0, 150.0, 700.0),
//! ];
//! let index = ScanRankIndex::new(&peaks)?;
//! assert_eq!(index.rank(1.5), 1);
//! match index.next_scan_peak(1.0, 160.0) {
//!     NearestPeak::Found(i) => assert_eq!(peaks[i].mz, 150.0),
//!     NearestPeak::NoMoreScans => unreachable!(),
//! }
//! # Ok::<(), mzrandex::scan::ScanIndexError>(())
//! ```
//!
//! ## Concurrency model
//!
//! The core is single-threaded, synchronous, blocking I/O. An
//! [`reader::IndexedReader`] owns exactly one file handle; workers that need
//! parallel access call [`reader::IndexedReader::try_clone`], which opens a
//! fresh handle while sharing the immutable, already-parsed
//! [`index::ContainerIndex`]. A [`scan::ScanRankIndex`] borrows the peak
//! storage it indexes, so the borrow checker enforces that the storage is
//! neither mutated nor dropped while the index is live.
//!
//! ## Architecture
//!
//! - [`index`]: footer index parsing and offset-table arithmetic
//! - [`reader`]: random-access byte-range extraction over one file handle
//! - [`record`]: record models, the decoder contract, and a reference
//!   mzML-style decoder
//! - [`scan`]: retention-time scan ranking and nearest-m/z search
//! - [`calib`]: mass-calibration models consuming the two layers above

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod calib;
pub mod index;
pub mod reader;
pub mod record;
pub mod scan;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calib::{
        fit_per_scan, ppm_error, Calibrant, CalibrationError, CalibrationModel, ModelKind,
    };
    pub use crate::index::{
        ContainerIndex, IndexError, OffsetEntry, OffsetTable, RawRecordSlice, RecordKind,
    };
    pub use crate::reader::{FileSummary, IndexedReader, ReaderError};
    pub use crate::record::{
        peaks_from_spectra, Chromatogram, DecodeError, Peak, RecordDecoder, Spectrum,
        XmlRecordDecoder,
    };
    pub use crate::scan::{NearestPeak, ScanIndexError, ScanRankIndex};
}
