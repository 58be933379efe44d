//! Nearest-value resampling of a run onto a shared time grid.
//!
//! The time column is sorted, so each target is located by halving the
//! candidate row range down to a window of [`WINDOW`] rows and then scanning
//! that window. The answer is the same row a full linear argmin of
//! `|time - target|` would give (lowest index on ties), at `O(log n)` per
//! target instead of `O(n)`. No interpolation takes place.

use ndarray::Array2;

use crate::error::{FoldError, Result};

/// Size below which the binary search hands over to a linear scan.
pub const WINDOW: usize = 3;

/// Index of the row whose time is closest to `target`, or `None` when there
/// are no rows. `times` must be non-decreasing.
pub fn nearest_index(times: &[f64], target: f64) -> Option<usize> {
    if times.is_empty() {
        return None;
    }

    let (mut lo, mut hi) = (0, times.len());
    while hi - lo > WINDOW {
        let half = (hi - lo) / 2;
        if times[lo + half] < target {
            lo = hi - half - 1;
        } else {
            hi = lo + half + 1;
        }
    }
    if hi - lo == 1 {
        return Some(lo);
    }

    let mut best = lo;
    for i in lo + 1..hi {
        if (times[i] - target).abs() < (times[best] - target).abs() {
            best = i;
        }
    }
    // Earlier rows with the same time may have been cut off by the search.
    let t = times[best];
    Some(times[..best].partition_point(|&x| x < t))
}

/// Fails on the first row whose time is NaN or smaller than its predecessor.
pub fn check_sorted(times: &[f64]) -> Result<()> {
    if let Some(row) = times.iter().position(|t| t.is_nan()) {
        return Err(FoldError::UnsortedTime { row });
    }
    match times.windows(2).position(|w| w[0] > w[1]) {
        Some(i) => Err(FoldError::UnsortedTime { row: i + 1 }),
        None => Ok(()),
    }
}

/// One output row per target: a copy of the nearest source row, with the
/// time column replaced by the target itself.
///
/// A matrix without rows yields NaN rows that only carry the target times.
pub fn resample(matrix: &Array2<f64>, time_column: usize, targets: &[f64]) -> Result<Array2<f64>> {
    let times = matrix.column(time_column).to_vec();
    check_sorted(&times)?;

    let mut out = Array2::from_elem((targets.len(), matrix.ncols()), f64::NAN);
    for (mut row, &target) in out.rows_mut().into_iter().zip(targets) {
        if let Some(src) = nearest_index(&times, target) {
            row.assign(&matrix.row(src));
        }
        row[time_column] = target;
    }
    Ok(out)
}
