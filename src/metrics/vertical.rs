//! Vertical error between two elevation rasters.

use imgref::ImgVec;
use log::debug;

use crate::error::{Error, Result};
use crate::metrics::Denominator;
use crate::raster::{Mask, Raster, Shape, ensure_same_shape};

/// Vertical error over the overlap region.
#[derive(Debug, Clone)]
pub struct VerticalError {
    /// Root mean square of the elevation differences.
    pub rmse: f64,
    /// `test - reference` per cell, zero outside the overlap.
    pub delta: Raster,
    /// Overlap mask the differences were taken over.
    pub overlap: Mask,
    /// Number of cells inside the overlap.
    pub overlap_cells: usize,
    /// Total number of grid cells.
    pub grid_cells: usize,
    /// Denominator used for the mean.
    pub denominator: Denominator,
}

impl VerticalError {
    /// True when no cell lies in the overlap.
    ///
    /// Under [`Denominator::GridCells`] such a result reports an RMSE of
    /// zero, i.e. perfect agreement over nothing.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.overlap_cells == 0
    }

    /// Differences with NaN outside the overlap.
    #[must_use]
    pub fn error_map(&self) -> Raster {
        let cells: Vec<f64> = self
            .delta
            .pixels()
            .zip(self.overlap.pixels())
            .map(|(d, inside)| if inside { d } else { f64::NAN })
            .collect();
        ImgVec::new(cells, self.delta.width(), self.delta.height())
    }

    /// [`error_map`](Self::error_map) clamped to `[-limit, limit]`.
    ///
    /// NaN cells stay NaN. A NaN `limit` leaves the map unclamped.
    #[must_use]
    pub fn clipped_error_map(&self, limit: f64) -> Raster {
        let map = self.error_map();
        if limit.is_nan() {
            return map;
        }
        let limit = limit.abs();
        let cells: Vec<f64> = map
            .pixels()
            .map(|v| if v.is_nan() { v } else { v.clamp(-limit, limit) })
            .collect();
        ImgVec::new(cells, map.width(), map.height())
    }
}

/// Compute the vertical error of `test` against `reference` over `overlap`.
///
/// `delta = test - reference` is zeroed outside the overlap and
/// `rmse = sqrt(sum(delta²) / N)`, with `N` chosen by `denominator`.
///
/// # Errors
///
/// - [`Error::ShapeMismatch`] if any two inputs differ in shape.
/// - [`Error::EmptyGrid`] for a grid without cells.
/// - [`Error::DegenerateOverlap`] for an empty overlap under
///   [`Denominator::ValidCells`].
/// - [`Error::NonFiniteElevation`] if a difference inside the overlap is not
///   finite.
///
/// # Example
///
/// ```
/// use dsm_eval::metrics::{vertical_error, Denominator};
/// use dsm_eval::raster::{filled_mask, raster_from_rows, Shape};
///
/// let reference = raster_from_rows(vec![10.0; 16], 4, 4).unwrap();
/// let test = raster_from_rows(vec![12.0; 16], 4, 4).unwrap();
/// let overlap = filled_mask(Shape::new(4, 4), true).unwrap();
///
/// let error = vertical_error(&reference, &test, &overlap, Denominator::GridCells).unwrap();
/// assert_eq!(error.rmse, 2.0);
/// ```
pub fn vertical_error(
    reference: &Raster,
    test: &Raster,
    overlap: &Mask,
    denominator: Denominator,
) -> Result<VerticalError> {
    let shape = Shape::of(reference);
    ensure_same_shape("reference raster vs test raster", shape, Shape::of(test))?;
    ensure_same_shape("raster vs overlap mask", shape, Shape::of(overlap))?;
    if shape.is_empty() {
        return Err(Error::EmptyGrid {
            rows: shape.rows,
            cols: shape.cols,
        });
    }

    let mut delta = Vec::with_capacity(shape.cells());
    let mut sum_sq = 0.0;
    let mut overlap_cells = 0usize;

    for (i, ((r, t), inside)) in reference
        .pixels()
        .zip(test.pixels())
        .zip(overlap.pixels())
        .enumerate()
    {
        if !inside {
            delta.push(0.0);
            continue;
        }
        let d = t - r;
        if !d.is_finite() {
            return Err(Error::NonFiniteElevation {
                row: i / shape.cols,
                col: i % shape.cols,
            });
        }
        sum_sq += d * d;
        overlap_cells += 1;
        delta.push(d);
    }

    let n = match denominator {
        Denominator::GridCells => shape.cells(),
        Denominator::ValidCells if overlap_cells == 0 => {
            return Err(Error::DegenerateOverlap {
                cells: shape.cells(),
            });
        }
        Denominator::ValidCells => overlap_cells,
    };
    let rmse = (sum_sq / n as f64).sqrt();

    debug!(
        "vertical rmse {:.4} over {}/{} overlap cells ({})",
        rmse,
        overlap_cells,
        shape.cells(),
        denominator
    );

    Ok(VerticalError {
        rmse,
        delta: ImgVec::new(delta, shape.cols, shape.rows),
        overlap: overlap.clone(),
        overlap_cells,
        grid_cells: shape.cells(),
        denominator,
    })
}
