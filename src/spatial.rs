//! Nearest-neighbor matching of boundary points.
//!
//! The index is built once over the test boundary and queried for every
//! reference boundary point. Any structure implementing [`SpatialIndex`]
//! can serve; [`RTreeIndex`] is the default and [`BruteForceIndex`] is a
//! linear scan kept as a reference for small inputs and tests.

use log::debug;
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::error::{Error, Result};
use crate::raster::GridPoint;

/// Closest indexed point to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the slice the index was built from.
    pub index: usize,
    /// The indexed point.
    pub point: GridPoint,
    /// Euclidean distance from the query, in grid units.
    pub distance: f64,
}

/// A reference point paired with its nearest test point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Reference boundary point.
    pub reference: GridPoint,
    /// Nearest test boundary point.
    pub matched: GridPoint,
    /// Position of `matched` in the test point slice.
    pub matched_index: usize,
    /// Distance between the two points, in grid units.
    pub distance: f64,
}

/// Point index answering nearest-neighbor queries.
///
/// Built once, then read concurrently by the batch query.
pub trait SpatialIndex: Sync + Sized {
    /// Build an index over `points`.
    fn build(points: &[GridPoint]) -> Self;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// True if no points are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closest indexed point to `query`, or `None` if the index is empty.
    fn nearest(&self, query: GridPoint) -> Option<Neighbor>;
}

type Entry = GeomWithData<[f64; 2], usize>;

/// R-tree backed index.
pub struct RTreeIndex {
    tree: RTree<Entry>,
    points: Vec<GridPoint>,
}

impl SpatialIndex for RTreeIndex {
    fn build(points: &[GridPoint]) -> Self {
        let entries: Vec<Entry> = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(p.to_array(), i))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            points: points.to_vec(),
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: GridPoint) -> Option<Neighbor> {
        self.tree.nearest_neighbor(&query.to_array()).map(|entry| {
            let point = self.points[entry.data];
            Neighbor {
                index: entry.data,
                point,
                distance: query.distance(point),
            }
        })
    }
}

/// Linear-scan index.
///
/// Ties resolve to the earliest point in build order.
pub struct BruteForceIndex {
    points: Vec<GridPoint>,
}

impl SpatialIndex for BruteForceIndex {
    fn build(points: &[GridPoint]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: GridPoint) -> Option<Neighbor> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d2 = query.distance_squared(*p);
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((i, d2));
            }
        }
        best.map(|(index, d2)| Neighbor {
            index,
            point: self.points[index],
            distance: d2.sqrt(),
        })
    }
}

/// Match every reference point to its nearest test point.
///
/// The output is in reference order, one [`Match`] per reference point.
///
/// An empty `reference` yields an empty result whatever `test` holds. An
/// empty `test` with a non-empty `reference` is
/// [`Error::EmptyReferenceSet`].
pub fn match_nearest<I: SpatialIndex>(
    reference: &[GridPoint],
    test: &[GridPoint],
) -> Result<Vec<Match>> {
    if reference.is_empty() {
        return Ok(Vec::new());
    }
    if test.is_empty() {
        return Err(Error::EmptyReferenceSet);
    }

    let index = I::build(test);
    debug!(
        "matching {} reference points against {} test points",
        reference.len(),
        index.len()
    );

    reference
        .par_iter()
        .map(|&p| {
            let n = index.nearest(p).ok_or(Error::EmptyReferenceSet)?;
            Ok(Match {
                reference: p,
                matched: n.point,
                matched_index: n.index,
                distance: n.distance,
            })
        })
        .collect()
}

/// [`match_nearest`] with the default R-tree index.
pub fn match_boundaries(reference: &[GridPoint], test: &[GridPoint]) -> Result<Vec<Match>> {
    match_nearest::<RTreeIndex>(reference, test)
}

/// Distances of a match sequence, in the same order.
#[must_use]
pub fn match_distances(matches: &[Match]) -> Vec<f64> {
    matches.iter().map(|m| m.distance).collect()
}
