use serde::{Deserialize, Serialize};

/// Counts and index bookkeeping for one opened container.
///
/// Serializable for quick inspection without touching record bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Path the container was opened from
    pub path: String,
    /// Number of indexed spectra
    pub spectrum_count: usize,
    /// Number of indexed chromatograms
    pub chromatogram_count: usize,
    /// Byte offset of the embedded index list
    pub index_list_offset: u64,
    /// Whether spectra precede chromatograms in file order
    pub spectra_first: bool,
}

impl FileSummary {
    /// Render the summary as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
