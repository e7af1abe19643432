//! Reference decoder for mzML-framed records
//!
//! Pull-parses one `<spectrum>` or `<chromatogram>` fragment exactly as
//! delimited by the container index, driven by the CV accessions that type
//! the binary arrays. Only the fields the indexing core needs are extracted
//! (native id, scan start time, and the data arrays); full metadata parsing
//! belongs to a dedicated format layer, not here.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::binary::{BinaryDecoder, BinaryDecodeError, BinaryEncoding, Compression};
use super::{Chromatogram, DecodeError, RecordDecoder, Spectrum};

// PSI-MS CV accessions the decoder dispatches on
const SCAN_START_TIME: &str = "MS:1000016";
const MZ_ARRAY: &str = "MS:1000514";
const INTENSITY_ARRAY: &str = "MS:1000515";
const TIME_ARRAY: &str = "MS:1000595";
const FLOAT_32_BIT: &str = "MS:1000521";
const FLOAT_64_BIT: &str = "MS:1000523";
const ZLIB_COMPRESSION: &str = "MS:1000574";
const NO_COMPRESSION: &str = "MS:1000576";
const NUMPRESS_LINEAR: &str = "MS:1002312";
const NUMPRESS_PIC: &str = "MS:1002313";
const NUMPRESS_SLOF: &str = "MS:1002314";

/// Unit accession for minutes; scan start times are normalized to seconds
const UNIT_MINUTE: &str = "UO:0000031";

/// Reference [`RecordDecoder`] for mzML-framed records.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRecordDecoder;

impl XmlRecordDecoder {
    /// Create a decoder. Stateless; one instance serves any number of records.
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for XmlRecordDecoder {
    fn decode_spectrum(&self, bytes: &[u8]) -> Result<Spectrum, DecodeError> {
        let parsed = parse_fragment(bytes, b"spectrum")?;
        Ok(Spectrum {
            native_id: parsed.native_id,
            retention_time: parsed.retention_time,
            mz_array: parsed.mz,
            intensity_array: parsed.intensity,
        })
    }

    fn decode_chromatogram(&self, bytes: &[u8]) -> Result<Chromatogram, DecodeError> {
        let parsed = parse_fragment(bytes, b"chromatogram")?;
        Ok(Chromatogram {
            native_id: parsed.native_id,
            time_array: parsed.time,
            intensity_array: parsed.intensity,
        })
    }
}

/// Which data array the current `<binaryDataArray>` holds
#[derive(Clone, Copy, PartialEq, Eq)]
enum ArrayKind {
    Mz,
    Intensity,
    Time,
    Other,
}

#[derive(Default)]
struct ParsedRecord {
    native_id: String,
    default_array_length: Option<usize>,
    retention_time: Option<f64>,
    mz: Vec<f64>,
    intensity: Vec<f64>,
    time: Vec<f64>,
}

fn parse_fragment(bytes: &[u8], root: &[u8]) -> Result<ParsedRecord, DecodeError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut parsed = ParsedRecord::default();
    let mut saw_root = false;

    // State of the binaryDataArray currently being assembled
    let mut in_array = false;
    let mut in_binary = false;
    let mut encoding = BinaryEncoding::default();
    let mut compression = Compression::default();
    let mut array_kind = ArrayKind::Other;
    let mut payload = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                if name.as_ref() == root {
                    saw_root = true;
                    parsed.native_id = get_attribute(e, "id")?
                        .ok_or_else(|| DecodeError::MissingAttribute("id".to_string()))?;
                    parsed.default_array_length = get_attribute(e, "defaultArrayLength")?
                        .and_then(|v| v.trim().parse().ok());
                } else {
                    match name.as_ref() {
                        b"binaryDataArray" => {
                            in_array = true;
                            encoding = BinaryEncoding::default();
                            compression = Compression::default();
                            array_kind = ArrayKind::Other;
                            payload.clear();
                        }
                        b"binary" => in_binary = true,
                        b"cvParam" => {
                            apply_cv_param(e, in_array, &mut parsed, &mut encoding,
                                &mut compression, &mut array_kind)?;
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref t)) if in_binary => {
                payload.push_str(t.unescape()?.trim());
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"binary" => in_binary = false,
                b"binaryDataArray" => {
                    let values = BinaryDecoder::decode(
                        &payload,
                        encoding,
                        compression,
                        parsed.default_array_length,
                    )?;
                    match array_kind {
                        ArrayKind::Mz => parsed.mz = values,
                        ArrayKind::Intensity => parsed.intensity = values,
                        ArrayKind::Time => parsed.time = values,
                        ArrayKind::Other => {}
                    }
                    in_array = false;
                }
                name if name == root => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DecodeError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(DecodeError::InvalidStructure(format!(
            "no <{}> element in record bytes",
            String::from_utf8_lossy(root)
        )));
    }
    Ok(parsed)
}

fn apply_cv_param(
    e: &BytesStart,
    in_array: bool,
    parsed: &mut ParsedRecord,
    encoding: &mut BinaryEncoding,
    compression: &mut Compression,
    array_kind: &mut ArrayKind,
) -> Result<(), DecodeError> {
    let Some(accession) = get_attribute(e, "accession")? else {
        return Ok(());
    };
    if in_array {
        match accession.as_str() {
            FLOAT_32_BIT => *encoding = BinaryEncoding::Float32,
            FLOAT_64_BIT => *encoding = BinaryEncoding::Float64,
            ZLIB_COMPRESSION => *compression = Compression::Zlib,
            NO_COMPRESSION => *compression = Compression::None,
            NUMPRESS_LINEAR | NUMPRESS_PIC | NUMPRESS_SLOF => {
                return Err(DecodeError::Binary(
                    BinaryDecodeError::UnsupportedCompression(accession),
                ));
            }
            MZ_ARRAY => *array_kind = ArrayKind::Mz,
            INTENSITY_ARRAY => *array_kind = ArrayKind::Intensity,
            TIME_ARRAY => *array_kind = ArrayKind::Time,
            _ => {}
        }
    } else if accession == SCAN_START_TIME {
        if let Some(value) = get_attribute(e, "value")?.and_then(|v| v.trim().parse().ok()) {
            let unit = get_attribute(e, "unitAccession")?;
            parsed.retention_time = Some(normalize_retention_time(value, unit.as_deref()));
        }
    }
    Ok(())
}

/// Convert a scan start time to seconds based on its unit accession.
/// Seconds pass through; anything unrecognized is assumed to be seconds.
fn normalize_retention_time(value: f64, unit_accession: Option<&str>) -> f64 {
    match unit_accession {
        Some(UNIT_MINUTE) => value * 60.0,
        _ => value,
    }
}

/// Helper to get an attribute value from a BytesStart
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, DecodeError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DecodeError::Xml(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}
