//! Boundary extraction from validity masks.
//!
//! A valid cell is a boundary cell when its 3x3 neighborhood, itself
//! included, holds fewer than nine valid cells. Neighbors outside the grid
//! are taken by symmetric reflection: index `-1` reads index `0` and index
//! `n` reads index `n - 1`, so a cell on the border mirrors its own row or
//! column rather than seeing zero padding. As a consequence a mask that is
//! valid everywhere has no boundary at all; only invalid cells create one.
//!
//! [`BoundaryMode::OutsideInvalid`] instead counts cells beyond the grid as
//! invalid, which makes every valid border cell a boundary cell.
//!
//! Counting is separable: a horizontal 3-sum per row followed by a vertical
//! 3-sum per column, with rows processed in parallel.

use imgref::ImgVec;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raster::{GridPoint, Mask, Shape};

/// Number of cells in a full 3x3 neighborhood.
pub const FULL_NEIGHBORHOOD: u8 = 9;

/// How neighbors beyond the grid border are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Mirror the grid across its border (a border cell sees its own value).
    #[default]
    Symmetric,
    /// Treat every cell outside the grid as invalid.
    OutsideInvalid,
}

/// Map an index one step outside `0..n` back inside by symmetric reflection.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    if i < 0 {
        (-i - 1) as usize
    } else if i as usize >= n {
        2 * n - 1 - i as usize
    } else {
        i as usize
    }
}

/// Index to read for neighbor `i` of a line of length `n`, or `None` when the
/// neighbor counts as invalid.
#[inline]
fn neighbor_index(i: isize, n: usize, mode: BoundaryMode) -> Option<usize> {
    if i >= 0 && (i as usize) < n {
        return Some(i as usize);
    }
    match mode {
        BoundaryMode::Symmetric => Some(reflect(i, n)),
        BoundaryMode::OutsideInvalid => None,
    }
}

/// Count valid cells in every 3x3 neighborhood (symmetric boundary).
///
/// The result has the same shape as `mask`; every entry is in `0..=9`.
#[must_use]
pub fn neighbor_counts(mask: &Mask) -> ImgVec<u8> {
    neighbor_counts_with(mask, BoundaryMode::Symmetric)
}

/// Count valid cells in every 3x3 neighborhood.
#[must_use]
pub fn neighbor_counts_with(mask: &Mask, mode: BoundaryMode) -> ImgVec<u8> {
    let shape = Shape::of(mask);
    let (rows, cols) = (shape.rows, shape.cols);
    if shape.is_empty() {
        return ImgVec::new(Vec::new(), cols, rows);
    }

    let source: Vec<&[bool]> = mask.rows().collect();

    let mut horizontal = vec![0u8; rows * cols];
    horizontal
        .par_chunks_mut(cols)
        .zip(source.par_iter())
        .for_each(|(out, row)| {
            for (c, slot) in out.iter_mut().enumerate() {
                let c = c as isize;
                *slot = (c - 1..=c + 1)
                    .filter_map(|i| neighbor_index(i, cols, mode))
                    .map(|i| u8::from(row[i]))
                    .sum();
            }
        });

    let mut counts = vec![0u8; rows * cols];
    counts
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(r, out)| {
            let r = r as isize;
            for i in (r - 1..=r + 1).filter_map(|i| neighbor_index(i, rows, mode)) {
                let sums = &horizontal[i * cols..(i + 1) * cols];
                for (slot, sum) in out.iter_mut().zip(sums) {
                    *slot += sum;
                }
            }
        });

    ImgVec::new(counts, cols, rows)
}

/// Boundary cells of a mask (symmetric boundary).
///
/// The output is a subset of `mask`: a cell is marked when it is valid and
/// at least one of its nine (possibly reflected) neighborhood cells is not.
///
/// # Example
///
/// ```
/// use dsm_eval::edges::edge_mask;
/// use dsm_eval::raster::{count_valid, mask_from_rows};
///
/// // 5x5 valid footprint inside a ring of invalid cells
/// let cells: Vec<bool> = (0..49)
///     .map(|i| (1..6).contains(&(i / 7)) && (1..6).contains(&(i % 7)))
///     .collect();
/// let mask = mask_from_rows(cells, 7, 7).unwrap();
/// assert_eq!(count_valid(&edge_mask(&mask)), 16);
/// ```
#[must_use]
pub fn edge_mask(mask: &Mask) -> Mask {
    edge_mask_with(mask, BoundaryMode::Symmetric)
}

/// Boundary cells of a mask under the given border handling.
#[must_use]
pub fn edge_mask_with(mask: &Mask, mode: BoundaryMode) -> Mask {
    let counts = neighbor_counts_with(mask, mode);
    let cells: Vec<bool> = mask
        .pixels()
        .zip(counts.pixels())
        .map(|(valid, count)| valid && count < FULL_NEIGHBORHOOD)
        .collect();
    ImgVec::new(cells, mask.width(), mask.height())
}

/// Coordinates of the `true` cells of a mask, in row-major order.
#[must_use]
pub fn mask_points(mask: &Mask) -> Vec<GridPoint> {
    mask.rows()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v)
                .map(move |(c, _)| GridPoint::new(r, c))
        })
        .collect()
}

/// Boundary points of a mask (symmetric boundary), in row-major order.
#[must_use]
pub fn edge_points(mask: &Mask) -> Vec<GridPoint> {
    mask_points(&edge_mask(mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{count_valid, filled_mask, mask_from_rows};

    /// Direct 3x3 count, resolving each neighbor independently.
    fn direct_counts(mask: &Mask, mode: BoundaryMode) -> Vec<u8> {
        let rows = mask.height();
        let cols = mask.width();
        let cells: Vec<bool> = mask.pixels().collect();
        let mut out = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let mut count = 0u8;
                for dr in -1isize..=1 {
                    for dc in -1isize..=1 {
                        let rr = neighbor_index(r as isize + dr, rows, mode);
                        let cc = neighbor_index(c as isize + dc, cols, mode);
                        if let (Some(rr), Some(cc)) = (rr, cc) {
                            count += u8::from(cells[rr * cols + cc]);
                        }
                    }
                }
                out.push(count);
            }
        }
        out
    }

    /// Deterministic pseudo-random mask.
    fn scattered_mask(rows: usize, cols: usize, seed: u64) -> Mask {
        let mut state = seed;
        let cells: Vec<bool> = (0..rows * cols)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) % 4 != 0
            })
            .collect();
        mask_from_rows(cells, rows, cols).unwrap()
    }

    /// `inner x inner` valid block surrounded by one ring of invalid cells.
    fn framed_block(inner: usize) -> Mask {
        let n = inner + 2;
        let cells: Vec<bool> = (0..n * n)
            .map(|i| (1..=inner).contains(&(i / n)) && (1..=inner).contains(&(i % n)))
            .collect();
        mask_from_rows(cells, n, n).unwrap()
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(-1, 1), 0);
        assert_eq!(reflect(1, 1), 0);
        assert_eq!(neighbor_index(2, 5, BoundaryMode::Symmetric), Some(2));
        assert_eq!(neighbor_index(-1, 5, BoundaryMode::OutsideInvalid), None);
    }

    #[test]
    fn test_block_perimeter() {
        let mask = framed_block(5);
        let points = edge_points(&mask);
        assert_eq!(points.len(), 16);

        // Perimeter of the block sits at rows/cols 1 and 5 of the 7x7 grid
        for p in &points {
            assert!(p.row == 1 || p.row == 5 || p.col == 1 || p.col == 5);
        }
        for r in 2..=4 {
            for c in 2..=4 {
                assert!(!points.contains(&GridPoint::new(r, c)));
            }
        }
    }

    #[test]
    fn test_full_grid_outside_invalid() {
        let mask = filled_mask(Shape::new(5, 5), true).unwrap();
        let edges = edge_mask_with(&mask, BoundaryMode::OutsideInvalid);
        assert_eq!(count_valid(&edges), 16);

        let points = mask_points(&edges);
        for p in &points {
            assert!(p.row == 0 || p.row == 4 || p.col == 0 || p.col == 4);
        }
    }

    #[test]
    fn test_full_grid_symmetric_has_no_boundary() {
        let mask = filled_mask(Shape::new(5, 5), true).unwrap();
        let counts = neighbor_counts(&mask);
        assert!(counts.pixels().all(|c| c == FULL_NEIGHBORHOOD));
        assert!(edge_points(&mask).is_empty());
    }

    #[test]
    fn test_separable_matches_direct() {
        for (rows, cols, seed) in [(1, 1, 1), (1, 7, 2), (6, 1, 3), (9, 13, 4), (32, 17, 5)] {
            let mask = scattered_mask(rows, cols, seed);
            for mode in [BoundaryMode::Symmetric, BoundaryMode::OutsideInvalid] {
                let fast: Vec<u8> = neighbor_counts_with(&mask, mode).pixels().collect();
                assert_eq!(fast, direct_counts(&mask, mode), "{rows}x{cols} {mode:?}");
            }
        }
    }

    #[test]
    fn test_edges_subset_of_mask() {
        let mask = scattered_mask(20, 20, 42);
        let edges = edge_mask(&mask);
        for (valid, edge) in mask.pixels().zip(edges.pixels()) {
            assert!(!edge || valid);
        }
    }

    #[test]
    fn test_hole_marks_ring() {
        let mut cells = vec![true; 49];
        cells[3 * 7 + 3] = false;
        let mask = mask_from_rows(cells, 7, 7).unwrap();
        let points = edge_points(&mask);

        // Only the 8 cells around the hole; the grid border reflects onto itself
        assert_eq!(points.len(), 8);
        assert!(points.contains(&GridPoint::new(2, 2)));
        assert!(points.contains(&GridPoint::new(4, 4)));
        assert!(!points.contains(&GridPoint::new(3, 3)));
        assert!(!points.contains(&GridPoint::new(1, 3)));
    }

    #[test]
    fn test_reflection_at_border() {
        // A single invalid corner only touches its three in-grid neighbors
        let mut cells = vec![true; 16];
        cells[0] = false;
        let mask = mask_from_rows(cells, 4, 4).unwrap();
        let points = edge_points(&mask);
        assert_eq!(
            points,
            vec![GridPoint::new(0, 1), GridPoint::new(1, 0), GridPoint::new(1, 1)]
        );
    }

    #[test]
    fn test_points_row_major() {
        let mask = mask_from_rows(vec![false, true, true, false, true, false], 2, 3).unwrap();
        assert_eq!(
            mask_points(&mask),
            vec![GridPoint::new(0, 1), GridPoint::new(0, 2), GridPoint::new(1, 1)]
        );
    }

    #[test]
    fn test_empty_mask() {
        let mask: Mask = ImgVec::new(Vec::new(), 3, 0);
        assert!(edge_points(&mask).is_empty());
        assert!(edge_points(&filled_mask(Shape::new(3, 3), false).unwrap()).is_empty());
    }
}
