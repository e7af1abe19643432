//! Mass-calibration models
//!
//! The representative consumer of the indexing core: calibrant peaks with
//! known reference masses are binned into scans with
//! [`ScanRankIndex::rank`], and a correction function mapping observed m/z
//! to corrected m/z is fitted per scan or globally by ordinary least
//! squares. Record retrieval for the calibrants themselves goes through
//! [`crate::reader::IndexedReader`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scan::ScanRankIndex;

mod error;


pub use error::CalibrationError;

/// One calibration observation: a peak with a known reference mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibrant {
    /// Retention time of the scan the peak was observed in, in seconds
    pub retention_time: f64,
    /// The m/z the instrument reported
    pub observed_mz: f64,
    /// The theoretical m/z of the identified species
    pub reference_mz: f64,
}

/// Shape of the correction function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// `corrected = c0 + c1 * observed`
    Linear,
    /// `corrected = c0 + c1 * observed + c2 * observed^2`
    Quadratic,
}

impl ModelKind {
    /// Minimum number of calibrants required for a well-posed fit.
    pub fn min_calibrants(self) -> usize {
        match self {
            ModelKind::Linear => 2,
            ModelKind::Quadratic => 3,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Linear => write!(f, "linear"),
            ModelKind::Quadratic => write!(f, "quadratic"),
        }
    }
}

/// A fitted mass-correction polynomial.
///
/// Coefficients are stored lowest order first; unused high-order terms are
/// zero, so a linear model evaluates identically through the quadratic form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    coefficients: [f64; 3],
}

impl CalibrationModel {
    /// Fit a model of the given shape to (observed, reference) pairs by
    /// ordinary least squares.
    pub fn fit(kind: ModelKind, calibrants: &[Calibrant]) -> Result<Self, CalibrationError> {
        let required = kind.min_calibrants();
        if calibrants.len() < required {
            return Err(CalibrationError::NotEnoughCalibrants {
                kind,
                required,
                got: calibrants.len(),
            });
        }
        match kind {
            ModelKind::Linear => fit_linear(calibrants),
            ModelKind::Quadratic => fit_quadratic(calibrants),
        }
    }

    /// Apply the correction: evaluate the polynomial at the observed m/z.
    pub fn predict(&self, observed_mz: f64) -> f64 {
        let [c0, c1, c2] = self.coefficients;
        c0 + observed_mz * (c1 + observed_mz * c2)
    }

    /// The fitted coefficients, lowest order first.
    pub fn coefficients(&self) -> [f64; 3] {
        self.coefficients
    }
}

/// Signed mass error of an observation in parts per million.
pub fn ppm_error(observed_mz: f64, reference_mz: f64) -> f64 {
    (observed_mz - reference_mz) / reference_mz * 1e6
}

/// Fit one model per scan.
///
/// Calibrants are binned into scans by ranking their retention times;
/// calibrants ranking past the last scan are dropped with a warning. Scans
/// with too few calibrants for a well-posed fit yield `None`.
pub fn fit_per_scan(
    index: &ScanRankIndex<'_>,
    calibrants: &[Calibrant],
    kind: ModelKind,
) -> Vec<Option<CalibrationModel>> {
    let mut bins: Vec<Vec<Calibrant>> = vec![Vec::new(); index.scan_count()];
    for calibrant in calibrants {
        let scan = index.rank(calibrant.retention_time);
        match bins.get_mut(scan) {
            Some(bin) => bin.push(*calibrant),
            None => log::warn!(
                "calibrant at RT {} ranks past the last scan, dropped",
                calibrant.retention_time
            ),
        }
    }
    bins.iter()
        .map(|bin| CalibrationModel::fit(kind, bin).ok())
        .collect()
}

fn observed_mean(calibrants: &[Calibrant]) -> f64 {
    calibrants.iter().map(|c| c.observed_mz).sum::<f64>() / calibrants.len() as f64
}

/// Least squares on centered observed m/z. m/z values sit hundreds of units
/// from zero, so fitting the raw polynomial would cancel catastrophically in
/// the normal equations; centering keeps them well conditioned.
fn fit_linear(calibrants: &[Calibrant]) -> Result<CalibrationModel, CalibrationError> {
    let n = calibrants.len() as f64;
    let mean = observed_mean(calibrants);

    let (mut sxx, mut sxy, mut sy) = (0.0, 0.0, 0.0);
    for c in calibrants {
        let x = c.observed_mz - mean;
        sxx += x * x;
        sxy += x * c.reference_mz;
        sy += c.reference_mz;
    }
    if sxx < 1e-12 * n * (mean * mean).max(1.0) {
        return Err(CalibrationError::SingularFit);
    }
    let c1 = sxy / sxx;
    let a0 = sy / n;
    // Expand y = a0 + c1 (x - mean) back to coefficients in x.
    Ok(CalibrationModel {
        coefficients: [a0 - c1 * mean, c1, 0.0],
    })
}

fn fit_quadratic(calibrants: &[Calibrant]) -> Result<CalibrationModel, CalibrationError> {
    let n = calibrants.len() as f64;
    let mean = observed_mean(calibrants);

    // Normal equations for y = a0 + a1 x + a2 x^2 in centered x.
    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for c in calibrants {
        let x = c.observed_mz - mean;
        let y = c.reference_mz;
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }
    let matrix = [[n, sx, sx2], [sx, sx2, sx3], [sx2, sx3, sx4]];
    let rhs = [sy, sxy, sx2y];
    let [a0, a1, a2] = solve_3x3(matrix, rhs).ok_or(CalibrationError::SingularFit)?;

    // Expand y = a0 + a1 (x - m) + a2 (x - m)^2 back to coefficients in x.
    let c2 = a2;
    let c1 = a1 - 2.0 * a2 * mean;
    let c0 = a0 - a1 * mean + a2 * mean * mean;
    Ok(CalibrationModel {
        coefficients: [c0, c1, c2],
    })
}

/// Gaussian elimination with partial pivoting for the 3x3 normal equations.
fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    let scale = a
        .iter()
        .flatten()
        .fold(1.0f64, |acc, &v| acc.max(v.abs()));
    for col in 0..3 {
        let pivot_row = (col..3)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() < 1e-9 * scale {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in (row + 1)..3 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
