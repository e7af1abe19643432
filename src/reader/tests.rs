use std::io::Write;

use tempfile::NamedTempFile;

use super::*;
use crate::index::{IndexError, RecordKind};
use crate::record::XmlRecordDecoder;

fn spectrum_record(id: &str, rt_seconds: f64) -> String {
    format!(
        r#"<spectrum id="{id}" defaultArrayLength="3">
<scanList count="1"><scan>
<cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{rt_seconds}" unitCvRef="UO" unitAccession="UO:0000010"/>
</scan></scanList>
<binaryDataArrayList count="2">
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
<binary>AAAAAAAAWUAAAAAAAABpQAAAAAAAwHJA</binary>
</binaryDataArray>
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
<binary>AADIQgAASEMAAJZD</binary>
</binaryDataArray>
</binaryDataArrayList>
</spectrum>"#
    )
}

/// Write a synthetic indexed container to disk.
///
/// Returns the temp file plus each spectrum's exact record text, in order.
fn write_container(spectra: &[(&str, f64)], chromatograms: &[&str]) -> (NamedTempFile, Vec<String>) {
    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(b"<?xml version=\"1.0\"?>\n<indexedmzML>\n<mzML>\n<run id=\"r\">\n<spectrumList>\n");

    let mut spectrum_offsets = Vec::new();
    let mut records = Vec::new();
    for (id, rt) in spectra {
        spectrum_offsets.push(buf.len() as u64);
        let record = spectrum_record(id, *rt);
        buf.extend_from_slice(record.as_bytes());
        buf.push(b'\n');
        records.push(record);
    }
    buf.extend_from_slice(b"</spectrumList>\n<chromatogramList>\n");

    let mut chromatogram_offsets = Vec::new();
    for id in chromatograms {
        chromatogram_offsets.push(buf.len() as u64);
        buf.extend_from_slice(
            format!("<chromatogram id=\"{id}\" defaultArrayLength=\"0\"></chromatogram>\n")
                .as_bytes(),
        );
    }
    buf.extend_from_slice(b"</chromatogramList>\n</run>\n</mzML>\n");

    let index_list_offset = buf.len() as u64;
    buf.extend_from_slice(b"<indexList count=\"2\">\n<index name=\"spectrum\">\n");
    for ((id, _), offset) in spectra.iter().zip(&spectrum_offsets) {
        buf.extend_from_slice(format!("<offset idRef=\"{id}\">{offset}</offset>\n").as_bytes());
    }
    buf.extend_from_slice(b"</index>\n<index name=\"chromatogram\">\n");
    for (id, offset) in chromatograms.iter().zip(&chromatogram_offsets) {
        buf.extend_from_slice(format!("<offset idRef=\"{id}\">{offset}</offset>\n").as_bytes());
    }
    buf.extend_from_slice(b"</index>\n</indexList>\n");
    buf.extend_from_slice(
        format!("<indexListOffset>{index_list_offset}</indexListOffset>\n</indexedmzML>\n").as_bytes(),
    );

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&buf).expect("write container");
    file.flush().expect("flush");
    (file, records)
}

#[test]
fn fetched_bytes_start_with_the_exact_record() {
    let (file, records) =
        write_container(&[("scan=1", 10.0), ("scan=2", 20.0), ("scan=3", 30.0)], &["TIC"]);
    let mut reader = IndexedReader::open(file.path()).expect("opens");

    assert_eq!(reader.count(RecordKind::Spectrum), 3);
    assert_eq!(reader.count(RecordKind::Chromatogram), 1);

    for (ordinal, record) in records.iter().enumerate() {
        let bytes = reader
            .fetch_record(RecordKind::Spectrum, ordinal)
            .expect("fetches");
        // The slice runs up to the next record, so it carries trailing
        // whitespace or list tags after the record itself.
        assert!(bytes.starts_with(record.as_bytes()));
    }
}

#[test]
fn fetch_by_native_id() {
    let (file, records) = write_container(&[("scan=1", 10.0), ("scan=2", 20.0)], &[]);
    let mut reader = IndexedReader::open(file.path()).expect("opens");

    let bytes = reader
        .fetch_record_by_id(RecordKind::Spectrum, "scan=2")
        .expect("fetches");
    assert!(bytes.starts_with(records[1].as_bytes()));

    let err = reader
        .fetch_record_by_id(RecordKind::Spectrum, "scan=9")
        .unwrap_err();
    assert!(matches!(
        err,
        ReaderError::IdNotFound { kind: RecordKind::Spectrum, ref native_id } if native_id == "scan=9"
    ));
}

#[test]
fn read_and_decode_spectrum() {
    let (file, _) = write_container(&[("scan=1", 12.5)], &[]);
    let mut reader = IndexedReader::open(file.path()).expect("opens");

    let spectrum = reader
        .read_spectrum(0, &XmlRecordDecoder::new())
        .expect("decodes");
    assert_eq!(spectrum.native_id, "scan=1");
    assert_eq!(spectrum.retention_time, Some(12.5));
    assert_eq!(spectrum.mz_array, vec![100.0, 200.0, 300.0]);
    assert_eq!(spectrum.intensity_array, vec![100.0, 200.0, 300.0]);
}

#[test]
fn out_of_range_ordinal_fails_hard() {
    let (file, _) = write_container(&[("scan=1", 10.0)], &[]);
    let reader = IndexedReader::open(file.path()).expect("opens");

    let err = reader.raw_range(RecordKind::Spectrum, 1).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Index(IndexError::OrdinalOutOfRange { ordinal: 1, count: 1, .. })
    ));
}

#[test]
fn cloned_reader_shares_the_index_but_not_the_handle() {
    let (file, records) = write_container(&[("scan=1", 10.0), ("scan=2", 20.0)], &[]);
    let mut reader = IndexedReader::open(file.path()).expect("opens");
    let mut clone = reader.try_clone().expect("clones");

    assert!(Arc::ptr_eq(&reader.shared_index(), &clone.shared_index()));

    // Interleaved fetches on the two handles stay independent.
    let a = reader.fetch_record(RecordKind::Spectrum, 0).expect("fetches");
    let b = clone.fetch_record(RecordKind::Spectrum, 1).expect("fetches");
    let a2 = reader.fetch_record(RecordKind::Spectrum, 0).expect("fetches");
    assert!(a.starts_with(records[0].as_bytes()));
    assert!(b.starts_with(records[1].as_bytes()));
    assert_eq!(a, a2);
}

#[test]
fn summary_reports_counts_and_layout() {
    let (file, _) = write_container(&[("scan=1", 10.0), ("scan=2", 20.0)], &["TIC"]);
    let reader = IndexedReader::open(file.path()).expect("opens");

    let summary = reader.summary();
    assert_eq!(summary.spectrum_count, 2);
    assert_eq!(summary.chromatogram_count, 1);
    assert!(summary.spectra_first);
    assert_eq!(summary.index_list_offset, reader.index().index_list_offset());

    let json = summary.to_json().expect("serializes");
    assert!(json.contains("\"spectrum_count\": 2"));
}

#[test]
fn open_missing_file_is_an_io_error() {
    let err = IndexedReader::open("/nonexistent/file.mzML").unwrap_err();
    assert!(matches!(err, ReaderError::Io(_)));
}
