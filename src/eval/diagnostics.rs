//! Optional diagnostics collaborator.
//!
//! When an [`EvalSession`](crate::eval::EvalSession) is given a
//! [`DiagnosticSink`], it hands over the intermediate grids and point sets
//! behind the two metrics. The sink decides what to do with them (plot,
//! save, inspect); the metrics never depend on it.
//!
//! | Name | Title | Data |
//! |------|-------|------|
//! | [`HEIGHT_ERROR`] | Terrain Model - Height Error | error map, NaN outside overlap |
//! | [`HEIGHT_ERROR_CLIPPED`] | Terrain Model - Height Error | error map clamped to the clip limit |
//! | [`REFERENCE_EDGES`] | Reference Model Perimeters | reference edge mask |
//! | [`TEST_EDGES`] | Test Model Perimeters | test edge mask |
//! | [`NEAREST_POINTS`] | Relative Horizontal Accuracy | edge points and matched pairs |

use crate::error::Result;
use crate::raster::{GridPoint, Mask, Raster};
use crate::spatial::Match;

/// Height error map.
pub const HEIGHT_ERROR: &str = "relVertAcc_hgtErr";
/// Height error map clamped to the clip limit.
pub const HEIGHT_ERROR_CLIPPED: &str = "relVertAcc_hgtErr_clipped";
/// Reference boundary mask.
pub const REFERENCE_EDGES: &str = "relHorzAcc_edgeMapRef";
/// Test boundary mask.
pub const TEST_EDGES: &str = "relHorzAcc_edgeMapTest";
/// Boundary points with nearest-neighbor pairs.
pub const NEAREST_POINTS: &str = "relHorzAcc_nearestPoints";

/// Payload of a diagnostic.
#[derive(Debug, Clone, Copy)]
pub enum PlotData<'a> {
    /// Continuous grid (NaN marks cells without data).
    Grid(&'a Raster),
    /// Boolean grid.
    Mask(&'a Mask),
    /// Reference points (drawn red), test points (drawn blue), and the
    /// segment joining each reference point to its match.
    Matches {
        /// Reference boundary points.
        reference: &'a [GridPoint],
        /// Test boundary points.
        test: &'a [GridPoint],
        /// One match per reference point.
        matches: &'a [Match],
    },
}

/// A named diagnostic handed to a sink.
#[derive(Debug, Clone, Copy)]
pub struct Plot<'a> {
    /// Stable identifier, usable as a file stem.
    pub name: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Figure number for grid plots.
    pub figure: Option<u32>,
    /// Whether a color scale should accompany the plot.
    pub colorbar: bool,
    /// The data.
    pub data: PlotData<'a>,
}

/// Receiver for diagnostics.
///
/// Closures `FnMut(Plot<'_>) -> Result<()>` implement this trait.
pub trait DiagnosticSink {
    /// Receive one diagnostic.
    fn emit(&mut self, plot: Plot<'_>) -> Result<()>;
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Plot<'_>) -> Result<()>,
{
    fn emit(&mut self, plot: Plot<'_>) -> Result<()> {
        self(plot)
    }
}

/// Emit through an optional sink.
pub(crate) fn emit(sink: &mut Option<&mut dyn DiagnosticSink>, plot: Plot<'_>) -> Result<()> {
    match sink {
        Some(sink) => sink.emit(plot),
        None => Ok(()),
    }
}
