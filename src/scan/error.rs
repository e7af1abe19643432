/// Errors reported while building a scan-rank index
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanIndexError {
    /// Retention time decreased between consecutive peaks
    #[error("peaks not sorted by retention time at position {index}")]
    UnsortedRetentionTime {
        /// Position of the first out-of-order peak
        index: usize,
    },

    /// m/z decreased between consecutive peaks of the same scan
    #[error("peaks within a scan not sorted by m/z at position {index}")]
    UnsortedMz {
        /// Position of the first out-of-order peak
        index: usize,
    },
}
