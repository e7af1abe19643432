//! Binary data array decoding
//!
//! mzML-framed records store numerical arrays as base64 text, optionally
//! zlib-compressed, holding little-endian 32- or 64-bit floats. The pipeline
//! is: base64 decode, decompress if needed, reinterpret bytes as floats.
//!
//! MS-Numpress codecs are out of scope; their accessions are recognized only
//! to produce a clear [`BinaryDecodeError::UnsupportedCompression`].

use std::io::Read;

use base64::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

/// Numerical precision of a binary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// 32-bit little-endian floats (accession MS:1000521)
    Float32,
    /// 64-bit little-endian floats (accession MS:1000523)
    #[default]
    Float64,
}

impl BinaryEncoding {
    /// Bytes per encoded value.
    pub fn byte_size(self) -> usize {
        match self {
            BinaryEncoding::Float32 => 4,
            BinaryEncoding::Float64 => 8,
        }
    }
}

/// Compression applied to a binary array before base64 encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw binary (accession MS:1000576)
    #[default]
    None,
    /// zlib deflate (accession MS:1000574)
    Zlib,
}

/// Errors that can occur during binary array decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// The base64 payload was malformed
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decompression or byte-cursor read failed
    #[error("I/O error while decoding: {0}")]
    Io(#[from] std::io::Error),

    /// The decoded byte count is not a whole number of values
    #[error("binary payload of {byte_len} bytes is not a whole number of {width}-byte values")]
    TruncatedData {
        /// Decoded payload length in bytes
        byte_len: usize,
        /// Value width implied by the declared encoding
        width: usize,
    },

    /// The decoded value count disagrees with the record's declared length
    #[error("expected {expected} values, decoded {actual}")]
    LengthMismatch {
        /// Declared array length
        expected: usize,
        /// Number of values actually decoded
        actual: usize,
    },

    /// Compression scheme the core does not implement (e.g. MS-Numpress)
    #[error("unsupported compression accession {0:?}")]
    UnsupportedCompression(String),
}

/// Decoder for base64-framed binary arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode one binary array to `f64` values.
    ///
    /// `expected_len`, when known from the record's declared array length,
    /// is validated against the decoded count.
    pub fn decode(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: Compression,
        expected_len: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = BASE64_STANDARD.decode(trimmed)?;
        let raw = match compression {
            Compression::None => decoded,
            Compression::Zlib => {
                let mut inflated = Vec::new();
                ZlibDecoder::new(&decoded[..]).read_to_end(&mut inflated)?;
                inflated
            }
        };

        let values = Self::bytes_to_floats(&raw, encoding)?;
        if let Some(expected) = expected_len {
            if values.len() != expected {
                return Err(BinaryDecodeError::LengthMismatch {
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(values)
    }

    fn bytes_to_floats(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let width = encoding.byte_size();
        if bytes.len() % width != 0 {
            return Err(BinaryDecodeError::TruncatedData {
                byte_len: bytes.len(),
                width,
            });
        }

        let count = bytes.len() / width;
        let mut values = Vec::with_capacity(count);
        let mut cursor = bytes;
        match encoding {
            BinaryEncoding::Float32 => {
                for _ in 0..count {
                    values.push(f64::from(cursor.read_f32::<LittleEndian>()?));
                }
            }
            BinaryEncoding::Float64 => {
                for _ in 0..count {
                    values.push(cursor.read_f64::<LittleEndian>()?);
                }
            }
        }
        Ok(values)
    }
}
