//! Shared helpers for integration tests: synthetic indexed containers.

use std::io::Write;

use tempfile::NamedTempFile;

/// One synthetic spectrum: native id, retention time in seconds, and its
/// (mz, intensity) peaks.
pub struct SpectrumSpec {
    pub id: String,
    pub rt_seconds: f64,
    pub peaks: Vec<(f64, f64)>,
}

impl SpectrumSpec {
    pub fn new(id: &str, rt_seconds: f64, peaks: &[(f64, f64)]) -> Self {
        Self {
            id: id.to_string(),
            rt_seconds,
            peaks: peaks.to_vec(),
        }
    }
}

fn base64_f64(values: &[f64]) -> String {
    use base64::prelude::*;
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    BASE64_STANDARD.encode(bytes)
}

fn spectrum_xml(spec: &SpectrumSpec) -> String {
    let mz: Vec<f64> = spec.peaks.iter().map(|p| p.0).collect();
    let intensity: Vec<f64> = spec.peaks.iter().map(|p| p.1).collect();
    format!(
        r#"<spectrum id="{id}" defaultArrayLength="{len}">
<scanList count="1"><scan>
<cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{rt}" unitCvRef="UO" unitAccession="UO:0000010"/>
</scan></scanList>
<binaryDataArrayList count="2">
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
<binary>{mz_b64}</binary>
</binaryDataArray>
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
<binary>{intensity_b64}</binary>
</binaryDataArray>
</binaryDataArrayList>
</spectrum>"#,
        id = spec.id,
        len = spec.peaks.len(),
        rt = spec.rt_seconds,
        mz_b64 = base64_f64(&mz),
        intensity_b64 = base64_f64(&intensity),
    )
}

fn chromatogram_xml(id: &str, times: &[f64], intensities: &[f64]) -> String {
    format!(
        r#"<chromatogram id="{id}" defaultArrayLength="{len}">
<binaryDataArrayList count="2">
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000595" name="time array"/>
<binary>{time_b64}</binary>
</binaryDataArray>
<binaryDataArray>
<cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
<cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
<cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
<binary>{intensity_b64}</binary>
</binaryDataArray>
</binaryDataArrayList>
</chromatogram>"#,
        len = times.len(),
        time_b64 = base64_f64(times),
        intensity_b64 = base64_f64(intensities),
    )
}

/// Write a complete indexed container with real footer bookkeeping.
pub fn write_container(
    spectra: &[SpectrumSpec],
    chromatograms: &[(&str, Vec<f64>, Vec<f64>)],
) -> NamedTempFile {
    let mut buf: Vec<u8> = Vec::new();
    buf.extend_from_slice(
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<indexedmzML>\n<mzML>\n<run id=\"run0\">\n<spectrumList>\n",
    );

    let mut spectrum_offsets = Vec::new();
    for spec in spectra {
        spectrum_offsets.push(buf.len() as u64);
        buf.extend_from_slice(spectrum_xml(spec).as_bytes());
        buf.push(b'\n');
    }
    buf.extend_from_slice(b"</spectrumList>\n<chromatogramList>\n");

    let mut chromatogram_offsets = Vec::new();
    for (id, times, intensities) in chromatograms {
        chromatogram_offsets.push(buf.len() as u64);
        buf.extend_from_slice(chromatogram_xml(id, times, intensities).as_bytes());
        buf.push(b'\n');
    }
    buf.extend_from_slice(b"</chromatogramList>\n</run>\n</mzML>\n");

    let index_list_offset = buf.len() as u64;
    buf.extend_from_slice(b"<indexList count=\"2\">\n<index name=\"spectrum\">\n");
    for (spec, offset) in spectra.iter().zip(&spectrum_offsets) {
        buf.extend_from_slice(
            format!("<offset idRef=\"{}\">{}</offset>\n", spec.id, offset).as_bytes(),
        );
    }
    buf.extend_from_slice(b"</index>\n<index name=\"chromatogram\">\n");
    for ((id, _, _), offset) in chromatograms.iter().zip(&chromatogram_offsets) {
        buf.extend_from_slice(format!("<offset idRef=\"{id}\">{offset}</offset>\n").as_bytes());
    }
    buf.extend_from_slice(b"</index>\n</indexList>\n");
    buf.extend_from_slice(
        format!("<indexListOffset>{index_list_offset}</indexListOffset>\n</indexedmzML>\n")
            .as_bytes(),
    );

    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&buf).expect("write container");
    file.flush().expect("flush");
    file
}
