//! Elevation rasters, validity masks, and mask intersection.
//!
//! Grids are `imgref` images: width is the column count and height is the
//! row count. All grid operations check shapes at their boundary and fail
//! with [`Error::ShapeMismatch`] instead of truncating or broadcasting.

use imgref::ImgVec;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Elevation raster (one `f64` per cell).
pub type Raster = ImgVec<f64>;

/// Validity mask (`true` marks a cell with a defined elevation).
pub type Mask = ImgVec<bool>;

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Shape {
    /// Create a shape from row and column counts.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of an image.
    #[must_use]
    pub fn of<T>(img: &ImgVec<T>) -> Self {
        Self {
            rows: img.height(),
            cols: img.width(),
        }
    }

    /// Total number of cells.
    #[must_use]
    pub fn cells(self) -> usize {
        self.rows * self.cols
    }

    /// True if the grid has no cells.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.cells() == 0
    }

    /// Shape as a `(rows, cols)` tuple.
    #[must_use]
    pub fn as_tuple(self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Integer cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl GridPoint {
    /// Create a point from row and column indices.
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Euclidean distance in grid-index units.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance in grid-index units.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dr = self.row.abs_diff(other.row) as f64;
        let dc = self.col.abs_diff(other.col) as f64;
        dr * dr + dc * dc
    }

    /// Coordinates as `[row, col]` floats.
    #[must_use]
    pub fn to_array(self) -> [f64; 2] {
        [self.row as f64, self.col as f64]
    }
}

/// Fail with [`Error::ShapeMismatch`] unless both shapes agree.
pub fn ensure_same_shape(what: &'static str, expected: Shape, actual: Shape) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            what,
            expected: expected.as_tuple(),
            actual: actual.as_tuple(),
        });
    }
    Ok(())
}

/// Fail with [`Error::EmptyGrid`] for a shape without cells.
fn ensure_cells(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(Error::EmptyGrid { rows, cols });
    }
    Ok(())
}

/// Build a raster from row-major values.
///
/// Returns [`Error::EmptyGrid`] for zero rows or columns and
/// [`Error::ShapeMismatch`] if `values.len() != rows * cols`.
pub fn raster_from_rows(values: Vec<f64>, rows: usize, cols: usize) -> Result<Raster> {
    ensure_cells(rows, cols)?;
    if values.len() != rows * cols {
        return Err(Error::ShapeMismatch {
            what: "raster buffer",
            expected: (rows, cols),
            actual: (values.len() / cols, cols),
        });
    }
    Ok(ImgVec::new(values, cols, rows))
}

/// Build a mask from row-major values.
///
/// Same checks as [`raster_from_rows`].
pub fn mask_from_rows(values: Vec<bool>, rows: usize, cols: usize) -> Result<Mask> {
    ensure_cells(rows, cols)?;
    if values.len() != rows * cols {
        return Err(Error::ShapeMismatch {
            what: "mask buffer",
            expected: (rows, cols),
            actual: (values.len() / cols, cols),
        });
    }
    Ok(ImgVec::new(values, cols, rows))
}

/// Mask with every cell set to `value`.
pub fn filled_mask(shape: Shape, value: bool) -> Result<Mask> {
    mask_from_rows(vec![value; shape.cells()], shape.rows, shape.cols)
}

/// Number of `true` cells in a mask.
#[must_use]
pub fn count_valid(mask: &Mask) -> usize {
    mask.pixels().filter(|&v| v).count()
}

/// Pointwise logical AND of two validity masks.
///
/// # Example
///
/// ```
/// use dsm_eval::raster::{intersect_masks, mask_from_rows};
///
/// let a = mask_from_rows(vec![true, true, false, false], 2, 2).unwrap();
/// let b = mask_from_rows(vec![true, false, true, false], 2, 2).unwrap();
/// let both = intersect_masks(&a, &b).unwrap();
/// let cells: Vec<bool> = both.pixels().collect();
/// assert_eq!(cells, vec![true, false, false, false]);
/// ```
pub fn intersect_masks(a: &Mask, b: &Mask) -> Result<Mask> {
    let shape = Shape::of(a);
    ensure_same_shape("reference mask vs test mask", shape, Shape::of(b))?;

    let cells: Vec<bool> = a
        .pixels()
        .zip(b.pixels())
        .map(|(x, y)| x && y)
        .collect();
    Ok(ImgVec::new(cells, shape.cols, shape.rows))
}

/// Derive a validity mask from a raster.
///
/// A cell is valid when it is finite and, if `nodata` is given, not equal
/// to that value.
#[must_use]
pub fn mask_from_nodata(raster: &Raster, nodata: Option<f64>) -> Mask {
    let cells: Vec<bool> = raster
        .pixels()
        .map(|v| v.is_finite() && nodata.map_or(true, |nd| v != nd))
        .collect();
    ImgVec::new(cells, raster.width(), raster.height())
}
