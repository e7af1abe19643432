//! Locating and parsing the trailing index block
//!
//! The footer scan reads a bounded window from the end of the file, finds
//! the `<indexListOffset>` marker, then seeks to the announced offset and
//! parses the flat `<indexList>` with a pull parser. Only the tail window
//! and the index block itself are ever read; record bodies are not touched.

use std::io::{Read, Seek, SeekFrom};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::models::{OffsetEntry, OffsetTable};
use super::{ContainerIndex, IndexError, RecordKind};

/// Size of the end-of-file window searched for the footer marker (1KB)
pub(crate) const FOOTER_WINDOW: usize = 1024;

const OPEN_TAG: &str = "<indexListOffset>";
const CLOSE_TAG: &str = "</indexListOffset>";

pub(crate) fn read_container_index<R: Read + Seek>(
    reader: &mut R,
) -> Result<ContainerIndex, IndexError> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    let window = std::cmp::min(FOOTER_WINDOW as u64, file_size) as usize;
    reader.seek(SeekFrom::End(-(window as i64)))?;

    let mut tail = vec![0u8; window];
    reader.read_exact(&mut tail)?;
    let tail = String::from_utf8_lossy(&tail);

    let open = tail
        .find(OPEN_TAG)
        .ok_or(IndexError::FooterMarkerMissing { window })?;
    let start = open + OPEN_TAG.len();
    let close = tail[start..]
        .find(CLOSE_TAG)
        .ok_or(IndexError::FooterMarkerMissing { window })?;
    let text = tail[start..start + close].trim();
    let offset: u64 = text.parse().map_err(|_| IndexError::MalformedFooter {
        text: text.to_string(),
    })?;
    if offset >= file_size {
        return Err(IndexError::OffsetBeyondEof { offset, file_size });
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut block = Vec::new();
    reader.read_to_end(&mut block)?;

    parse_index_list(&block, offset)
}

/// Parse the raw `<indexList>` XML into a [`ContainerIndex`].
fn parse_index_list(data: &[u8], index_list_offset: u64) -> Result<ContainerIndex, IndexError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut spectra: Vec<OffsetEntry> = Vec::new();
    let mut chromatograms: Vec<OffsetEntry> = Vec::new();
    let mut current_index_name: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"index" => {
                    current_index_name = get_attribute(e, "name")?;
                    if let Some(name) = current_index_name.as_deref() {
                        if name != "spectrum" && name != "chromatogram" {
                            log::warn!("skipping unknown index {name:?} in index list");
                        }
                    }
                }
                b"offset" => {
                    let native_id = get_attribute(e, "idRef")?
                        .ok_or_else(|| IndexError::MissingAttribute("idRef".to_string()))?;
                    let mut text_buf = Vec::new();
                    let offset = match reader.read_event_into(&mut text_buf) {
                        Ok(Event::Text(t)) => t
                            .unescape()?
                            .trim()
                            .parse::<u64>()
                            .map_err(|_| IndexError::MalformedOffset {
                                native_id: native_id.clone(),
                            })?,
                        Ok(_) => return Err(IndexError::MalformedOffset { native_id }),
                        Err(e) => return Err(IndexError::Xml(e)),
                    };
                    match current_index_name.as_deref() {
                        Some("spectrum") => spectra.push(OffsetEntry { native_id, offset }),
                        Some("chromatogram") => {
                            chromatograms.push(OffsetEntry { native_id, offset })
                        }
                        _ => {}
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"index" => current_index_name = None,
                b"indexList" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(IndexError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let spectra = OffsetTable::from_entries(RecordKind::Spectrum, spectra)?;
    let chromatograms = OffsetTable::from_entries(RecordKind::Chromatogram, chromatograms)?;
    log::debug!(
        "parsed container index: {} spectra, {} chromatograms, index list at byte {}",
        spectra.len(),
        chromatograms.len(),
        index_list_offset
    );
    ContainerIndex::new(spectra, chromatograms, index_list_offset)
}

/// Helper to get an attribute value from a BytesStart
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, IndexError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| IndexError::Xml(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}
