//! Descriptive statistics for matched boundary distances and elevation
//! differences.
//!
//! [`Summary`] holds count, mean, RMS, median, spread and tail percentiles.

use serde::{Deserialize, Serialize};

/// Descriptive statistics for a set of measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Root mean square.
    pub rms: f64,
    /// Median value.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl Summary {
    /// Compute summary statistics for a slice of values.
    ///
    /// Returns `None` if the slice is empty.
    #[must_use]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let mean_sq = sorted.iter().map(|x| x * x).sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            rms: mean_sq.sqrt(),
            median: percentile_sorted(&sorted, 0.5),
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p90: percentile_sorted(&sorted, 0.90),
            p95: percentile_sorted(&sorted, 0.95),
        })
    }
}

/// Percentile of pre-sorted values, linear interpolation (R-7 method).
///
/// `p` is in `0.0..=1.0`.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_compute() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let summary = Summary::compute(&values).unwrap();

        assert_eq!(summary.count, 10);
        assert_relative_eq!(summary.mean, 5.5);
        assert_relative_eq!(summary.median, 5.5);
        assert_relative_eq!(summary.rms, (38.5f64).sqrt());
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 10.0);
        assert_relative_eq!(summary.p90, 9.1, epsilon = 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        assert!(Summary::compute(&[]).is_none());
    }

    #[test]
    fn test_summary_zero_distances() {
        let summary = Summary::compute(&[0.0; 8]).unwrap();
        assert_eq!(summary.rms, 0.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.p95, 0.0);
    }

    #[test]
    fn test_summary_unsorted_input() {
        let summary = Summary::compute(&[5.0, 1.0, 3.0]).unwrap();
        assert_relative_eq!(summary.median, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);

        let single = Summary::compute(&[7.0]).unwrap();
        assert_eq!(single.median, 7.0);
        assert_eq!(single.p95, 7.0);
    }

    #[test]
    fn test_percentile_sorted() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile_sorted(&values, 0.25), 2.0);
        assert_relative_eq!(percentile_sorted(&values, 0.9), 4.6, epsilon = 1e-9);
        assert_relative_eq!(percentile_sorted(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(percentile_sorted(&[], 0.5), 0.0);
    }
}
