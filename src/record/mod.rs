//! Record models and the decoder contract
//!
//! The index and reader layers only delimit record byte ranges; turning a
//! raw range into an in-memory [`Spectrum`] or [`Chromatogram`] is the job
//! of a [`RecordDecoder`]. The crate ships one reference implementation,
//! [`XmlRecordDecoder`], for mzML-framed records; alternative container
//! flavors plug in their own decoder behind the same trait.

mod binary;
mod xml;


pub use binary::{BinaryDecodeError, BinaryDecoder, BinaryEncoding, Compression};
pub use xml::XmlRecordDecoder;

/// One peak: the (retention time, m/z, intensity) triple that the scan-rank
/// index is built over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Retention time in seconds
    pub retention_time: f64,
    /// Mass-to-charge ratio
    pub mz: f64,
    /// Signal intensity
    pub intensity: f64,
}

impl Peak {
    /// Construct a peak from its three coordinates.
    pub fn new(retention_time: f64, mz: f64, intensity: f64) -> Self {
        Self {
            retention_time,
            mz,
            intensity,
        }
    }
}

/// A decoded spectrum record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Native id from the container (e.g. `scan=12`)
    pub native_id: String,
    /// Retention time in seconds, when the record carries one
    pub retention_time: Option<f64>,
    /// m/z values, ascending
    pub mz_array: Vec<f64>,
    /// Intensities parallel to `mz_array`
    pub intensity_array: Vec<f64>,
}

impl Spectrum {
    /// Number of peaks in this spectrum.
    pub fn peak_count(&self) -> usize {
        self.mz_array.len()
    }
}

/// A decoded chromatogram record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chromatogram {
    /// Native id from the container (e.g. `TIC`)
    pub native_id: String,
    /// Time points in seconds
    pub time_array: Vec<f64>,
    /// Intensities parallel to `time_array`
    pub intensity_array: Vec<f64>,
}

impl Chromatogram {
    /// Number of data points in this chromatogram.
    pub fn point_count(&self) -> usize {
        self.time_array.len()
    }
}

/// Turns one record's raw bytes into an in-memory object.
///
/// The index/reader core calls this contract and propagates its failures
/// unchanged; it never interprets record bytes itself.
pub trait RecordDecoder {
    /// Decode a spectrum record from its exact byte range.
    fn decode_spectrum(&self, bytes: &[u8]) -> Result<Spectrum, DecodeError>;

    /// Decode a chromatogram record from its exact byte range.
    fn decode_chromatogram(&self, bytes: &[u8]) -> Result<Chromatogram, DecodeError>;
}

/// Errors produced by record decoding
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Error parsing the record XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error decoding a binary data array
    #[error("binary decode error: {0}")]
    Binary(#[from] BinaryDecodeError),

    /// A required attribute was missing from the record
    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    /// The record structure did not match the expected framing
    #[error("invalid record structure: {0}")]
    InvalidStructure(String),

    /// UTF-8 encoding error in attribute or text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Flatten decoded spectra into the RT-ordered peak storage that a
/// [`crate::scan::ScanRankIndex`] borrows.
///
/// Spectra without a retention time cannot be placed on the RT axis and are
/// skipped with a warning. The output is sorted by retention time as long as
/// the input spectra are, which is the order the container stores them in.
pub fn peaks_from_spectra(spectra: &[Spectrum]) -> Vec<Peak> {
    let mut peaks = Vec::new();
    for spectrum in spectra {
        let Some(rt) = spectrum.retention_time else {
            log::warn!(
                "spectrum {:?} has no retention time, excluded from peak storage",
                spectrum.native_id
            );
            continue;
        };
        if spectrum.mz_array.len() != spectrum.intensity_array.len() {
            log::warn!(
                "spectrum {:?} has {} m/z values but {} intensities, trailing values dropped",
                spectrum.native_id,
                spectrum.mz_array.len(),
                spectrum.intensity_array.len()
            );
        }
        for (&mz, &intensity) in spectrum.mz_array.iter().zip(&spectrum.intensity_array) {
            peaks.push(Peak::new(rt, mz, intensity));
        }
    }
    peaks
}
