//! Horizontal error from matched boundary distances.

use crate::error::{Error, Result};

/// Root mean square of matched boundary distances.
///
/// # Errors
///
/// - [`Error::EmptyDistances`] when `distances` is empty. An empty sequence
///   means the reference footprint has no boundary, so there is nothing to
///   measure; no sentinel value is reported.
/// - [`Error::InvalidDistance`] for a negative or non-finite entry.
///
/// # Example
///
/// ```
/// use dsm_eval::metrics::horizontal_rmse;
///
/// assert_eq!(horizontal_rmse(&[5.0]).unwrap(), 5.0);
/// assert_eq!(horizontal_rmse(&[0.0, 0.0]).unwrap(), 0.0);
/// assert!(horizontal_rmse(&[]).is_err());
/// ```
pub fn horizontal_rmse(distances: &[f64]) -> Result<f64> {
    if distances.is_empty() {
        return Err(Error::EmptyDistances);
    }

    let mut sum_sq = 0.0;
    for (index, &d) in distances.iter().enumerate() {
        if !d.is_finite() || d < 0.0 {
            return Err(Error::InvalidDistance { index, value: d });
        }
        sum_sq += d * d;
    }

    Ok((sum_sq / distances.len() as f64).sqrt())
}
