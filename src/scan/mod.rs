//! Retention-time scan ranking and nearest-m/z search
//!
//! A [`ScanRankIndex`] is built over peak storage sorted by retention time
//! and answers three questions used throughout feature detection and
//! calibration:
//!
//! - which scan does a retention time fall in (O(log s) lower-bound),
//! - which peaks make up a given scan (index range into the storage),
//! - which peak in a neighboring scan is nearest to a query m/z
//!   (O(log n) with a one-step neighbor correction).
//!
//! The index stores plain `usize` positions into a borrowed `&[Peak]`
//! slice, so the borrow checker rules out use-after-reallocation: mutating
//! or dropping the storage while the index lives does not compile. Rebuild
//! the index after any change to the peaks.
//!
//! Construction validates its ordering preconditions and fails fast on
//! unsorted input instead of producing silently wrong query results.

use std::cell::Cell;
use std::ops::Range;

use crate::record::Peak;

mod error;


pub use error::ScanIndexError;

/// Outcome of a neighbor-scan peak query.
///
/// `NoMoreScans` is ordinary control flow, not a failure: algorithms that
/// walk a trace forward or backward through consecutive scans branch on it
/// to terminate their loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestPeak {
    /// Position of the nearest peak in the global peak storage
    Found(usize),
    /// No scan exists in the queried direction
    NoMoreScans,
}

impl NearestPeak {
    /// The found position, or `None` when the scans are exhausted.
    pub fn found(self) -> Option<usize> {
        match self {
            NearestPeak::Found(i) => Some(i),
            NearestPeak::NoMoreScans => None,
        }
    }

    /// Whether a peak was found.
    pub fn is_found(self) -> bool {
        matches!(self, NearestPeak::Found(_))
    }
}

/// Rank structure over retention-time-sorted peak storage.
///
/// One linear pass records a scan boundary wherever retention time strictly
/// increases, keeping the boundary positions plus each scan's retention
/// time. `boundaries` always holds one trailing end sentinel, so
/// `boundaries.len() == scan_rts.len() + 1`.
///
/// Repeated queries at the same retention time (the common pattern when
/// processing all peaks of one spectrum) hit a one-entry rank cache instead
/// of the binary search. The cache makes the type `!Sync`, which matches
/// the single-threaded usage model of the core.
#[derive(Debug)]
pub struct ScanRankIndex<'a> {
    peaks: &'a [Peak],
    /// Scan begin positions plus one end sentinel
    boundaries: Vec<usize>,
    /// Retention time of each scan, strictly increasing
    scan_rts: Vec<f64>,
    rank_cache: Cell<Option<(f64, usize)>>,
}

impl<'a> ScanRankIndex<'a> {
    /// Build the index over peaks sorted by retention time, with each scan's
    /// peaks sorted by m/z.
    ///
    /// Both orderings are validated during the construction pass; violations
    /// fail fast with the position of the first offending peak.
    pub fn new(peaks: &'a [Peak]) -> Result<Self, ScanIndexError> {
        let mut boundaries = Vec::new();
        let mut scan_rts = Vec::new();
        let mut prev_rt: Option<f64> = None;

        for (i, peak) in peaks.iter().enumerate() {
            match prev_rt {
                Some(rt) if peak.retention_time < rt => {
                    return Err(ScanIndexError::UnsortedRetentionTime { index: i });
                }
                Some(rt) if peak.retention_time == rt => {
                    if peak.mz < peaks[i - 1].mz {
                        return Err(ScanIndexError::UnsortedMz { index: i });
                    }
                }
                _ => {
                    // First peak, or retention time strictly increased
                    boundaries.push(i);
                    scan_rts.push(peak.retention_time);
                }
            }
            prev_rt = Some(peak.retention_time);
        }
        boundaries.push(peaks.len());

        Ok(Self {
            peaks,
            boundaries,
            scan_rts,
            rank_cache: Cell::new(None),
        })
    }

    /// Number of scans.
    pub fn scan_count(&self) -> usize {
        self.scan_rts.len()
    }

    /// The peak storage this index was built over.
    pub fn peaks(&self) -> &'a [Peak] {
        self.peaks
    }

    /// Retention time of the given scan, if in range.
    pub fn scan_retention_time(&self, scan: usize) -> Option<f64> {
        self.scan_rts.get(scan).copied()
    }

    /// Positions of the given scan's peaks in the global storage.
    pub fn scan_range(&self, scan: usize) -> Option<Range<usize>> {
        if scan >= self.scan_count() {
            return None;
        }
        Some(self.boundaries[scan]..self.boundaries[scan + 1])
    }

    /// The peaks of one scan as a slice of the global storage.
    pub fn scan_peaks(&self, scan: usize) -> Option<&'a [Peak]> {
        self.scan_range(scan).map(|r| &self.peaks[r])
    }

    /// Map a retention time to a scan ordinal: the first scan whose
    /// retention time is `>=` the query. Never fails; times before the first
    /// scan return 0 and times after the last return `scan_count()`.
    pub fn rank(&self, retention_time: f64) -> usize {
        if let Some((cached_rt, cached_rank)) = self.rank_cache.get() {
            if cached_rt == retention_time {
                return cached_rank;
            }
        }
        let rank = self
            .scan_rts
            .partition_point(|&scan_rt| scan_rt < retention_time);
        self.rank_cache.set(Some((retention_time, rank)));
        rank
    }

    /// Find the peak nearest to `mz` in the scan after the one `retention_time`
    /// ranks into.
    ///
    /// Returns [`NearestPeak::NoMoreScans`] when no following scan exists,
    /// which terminates forward trace walks.
    pub fn next_scan_peak(&self, retention_time: f64, mz: f64) -> NearestPeak {
        let scan = self.rank(retention_time);
        if scan + 1 >= self.scan_count() {
            return NearestPeak::NoMoreScans;
        }
        match self.nearest_in_scan(scan + 1, mz) {
            Some(position) => NearestPeak::Found(position),
            None => NearestPeak::NoMoreScans,
        }
    }

    /// Find the peak nearest to `mz` in the scan before the one
    /// `retention_time` ranks into. Symmetric to [`Self::next_scan_peak`].
    pub fn prev_scan_peak(&self, retention_time: f64, mz: f64) -> NearestPeak {
        let scan = self.rank(retention_time);
        if scan == 0 {
            return NearestPeak::NoMoreScans;
        }
        match self.nearest_in_scan(scan - 1, mz) {
            Some(position) => NearestPeak::Found(position),
            None => NearestPeak::NoMoreScans,
        }
    }

    /// Position of the peak in `scan` whose m/z is closest to the query.
    ///
    /// Lower-bound search, then one comparison against the immediate
    /// predecessor: on a centroided m/z grid the true nearest neighbor can
    /// sit just left of the lower-bound position. Ties go to the right-hand
    /// (lower-bound) candidate.
    pub fn nearest_in_scan(&self, scan: usize, mz: f64) -> Option<usize> {
        let range = self.scan_range(scan)?;
        let slice = &self.peaks[range.clone()];
        debug_assert!(!slice.is_empty(), "scans are non-empty by construction");

        let pos = slice.partition_point(|p| p.mz < mz);
        let local = if pos == slice.len() {
            slice.len() - 1
        } else if pos == 0 {
            0
        } else if (mz - slice[pos - 1].mz) < (slice[pos].mz - mz) {
            pos - 1
        } else {
            pos
        };
        Some(range.start + local)
    }
}
