//! Relative accuracy evaluation pipeline.
//!
//! [`EvalSession`] runs the full comparison of a test surface model against
//! a reference:
//!
//! 1. intersect the two validity masks
//! 2. vertical error over the overlap
//! 3. boundary extraction on each mask
//! 4. nearest-neighbor matching of reference boundary points to test ones
//! 5. horizontal error over the matched distances
//!
//! Each call is independent; the session only holds its configuration.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::edges::{BoundaryMode, edge_mask_with, mask_points};
use crate::error::{Error, Result};
use crate::eval::diagnostics::{self, DiagnosticSink, Plot, PlotData};
use crate::eval::report::AccuracyReport;
use crate::metrics::{
    Denominator, MetricsResult, VerticalError, horizontal_rmse, vertical_error,
};
use crate::raster::{GridPoint, Mask, Raster, Shape, ensure_same_shape, intersect_masks};
use crate::spatial::{Match, RTreeIndex, match_distances, match_nearest};

/// Default clamp for the clipped height error map, in elevation units.
pub const DEFAULT_CLIP_LIMIT: f64 = 5.0;

/// Configuration for an evaluation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Denominator of the vertical mean square.
    pub denominator: Denominator,

    /// Border handling for boundary extraction.
    pub boundary: BoundaryMode,

    /// Fail with [`Error::DegenerateOverlap`] instead of reporting a
    /// zero vertical RMSE when the masks do not overlap.
    pub strict_overlap: bool,

    /// Fail with [`Error::EmptyDistances`] or [`Error::EmptyReferenceSet`]
    /// instead of reporting no horizontal RMSE when a footprint has no
    /// boundary.
    #[serde(default)]
    pub require_boundary: bool,

    /// Clamp for the clipped height error diagnostic.
    pub clip_limit: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            denominator: Denominator::default(),
            boundary: BoundaryMode::default(),
            strict_overlap: false,
            require_boundary: false,
            clip_limit: DEFAULT_CLIP_LIMIT,
        }
    }
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    denominator: Option<Denominator>,
    boundary: Option<BoundaryMode>,
    strict_overlap: Option<bool>,
    require_boundary: Option<bool>,
    clip_limit: Option<f64>,
}

impl EvalConfigBuilder {
    /// Set the vertical RMSE denominator.
    #[must_use]
    pub fn denominator(mut self, denominator: Denominator) -> Self {
        self.denominator = Some(denominator);
        self
    }

    /// Set border handling for boundary extraction.
    #[must_use]
    pub fn boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Reject inputs whose masks do not overlap.
    #[must_use]
    pub fn strict_overlap(mut self, strict: bool) -> Self {
        self.strict_overlap = Some(strict);
        self
    }

    /// Reject inputs where either footprint has no boundary.
    #[must_use]
    pub fn require_boundary(mut self, require: bool) -> Self {
        self.require_boundary = Some(require);
        self
    }

    /// Set the clamp for the clipped height error diagnostic.
    #[must_use]
    pub fn clip_limit(mut self, limit: f64) -> Self {
        self.clip_limit = Some(limit);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        let defaults = EvalConfig::default();
        EvalConfig {
            denominator: self.denominator.unwrap_or(defaults.denominator),
            boundary: self.boundary.unwrap_or(defaults.boundary),
            strict_overlap: self.strict_overlap.unwrap_or(defaults.strict_overlap),
            require_boundary: self.require_boundary.unwrap_or(defaults.require_boundary),
            clip_limit: self.clip_limit.unwrap_or(defaults.clip_limit),
        }
    }
}

/// Condition that lowers confidence in a result without invalidating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The masks share no valid cell: the vertical RMSE of zero reflects
    /// the absence of a comparable region, not agreement.
    DegenerateOverlap {
        /// Total number of grid cells.
        cells: usize,
    },
    /// The reference mask has no boundary cells, so there is nothing to
    /// measure horizontally.
    EmptyReferenceBoundary,
    /// The test mask has no boundary cells to match against.
    EmptyTestBoundary,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateOverlap { cells } => write!(
                f,
                "no overlap between masks ({cells} cells); vertical RMSE of 0 is not meaningful"
            ),
            Self::EmptyReferenceBoundary => {
                write!(f, "reference mask has no boundary; horizontal RMSE not computed")
            }
            Self::EmptyTestBoundary => {
                write!(f, "test mask has no boundary; horizontal RMSE not computed")
            }
        }
    }
}

/// Outcome of one evaluation: the metrics plus what produced them.
#[derive(Debug, Clone)]
pub struct Evaluation {
    metrics: MetricsResult,
    /// Vertical error details.
    pub vertical: VerticalError,
    /// Reference boundary points, row-major.
    pub reference_edges: Vec<GridPoint>,
    /// Test boundary points, row-major.
    pub test_edges: Vec<GridPoint>,
    /// One match per reference boundary point, in the same order.
    pub matches: Vec<Match>,
    /// Low-confidence conditions found along the way.
    pub warnings: Vec<Warning>,
}

impl Evaluation {
    /// The two accuracy scalars.
    #[must_use]
    pub fn metrics(&self) -> MetricsResult {
        self.metrics
    }

    /// Matched distances, in reference boundary order.
    #[must_use]
    pub fn distances(&self) -> Vec<f64> {
        match_distances(&self.matches)
    }

    /// True if any warning was raised.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Build a serializable report.
    #[must_use]
    pub fn to_report(&self, name: &str, config: &EvalConfig) -> AccuracyReport {
        AccuracyReport::from_evaluation(name, self, config)
    }
}

/// Evaluation session.
///
/// # Example
///
/// ```
/// use dsm_eval::{EvalConfig, EvalSession};
/// use dsm_eval::raster::{mask_from_rows, raster_from_rows};
///
/// let reference = raster_from_rows(vec![10.0; 36], 6, 6).unwrap();
/// let test = raster_from_rows(vec![11.0; 36], 6, 6).unwrap();
/// let cells: Vec<bool> = (0..36)
///     .map(|i| (1..5).contains(&(i / 6)) && (1..5).contains(&(i % 6)))
///     .collect();
/// let mask = mask_from_rows(cells, 6, 6).unwrap();
///
/// let session = EvalSession::new(EvalConfig::default());
/// let evaluation = session.evaluate(&reference, &test, &mask, &mask).unwrap();
///
/// assert_eq!(evaluation.metrics().horizontal_rmse(), Some(0.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvalSession {
    config: EvalConfig,
}

impl EvalSession {
    /// Create a new evaluation session.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Compare `test` against `reference`.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if any raster or mask differs in shape.
    /// - [`Error::DegenerateOverlap`] if the masks do not overlap and either
    ///   `strict_overlap` is set or the denominator is
    ///   [`Denominator::ValidCells`].
    /// - [`Error::InvalidClipLimit`] if the clip limit is negative or not
    ///   finite.
    /// - [`Error::EmptyDistances`] if the reference mask has no boundary and
    ///   `require_boundary` is set.
    /// - [`Error::EmptyReferenceSet`] if the test mask has no boundary while
    ///   the reference mask does, and `require_boundary` is set.
    ///
    /// Without `require_boundary`, a missing boundary leaves the horizontal
    /// RMSE unset and adds [`Warning::EmptyReferenceBoundary`] or
    /// [`Warning::EmptyTestBoundary`]; the vertical RMSE is kept.
    pub fn evaluate(
        &self,
        reference: &Raster,
        test: &Raster,
        reference_mask: &Mask,
        test_mask: &Mask,
    ) -> Result<Evaluation> {
        self.run(reference, test, reference_mask, test_mask, None)
    }

    /// [`evaluate`](Self::evaluate), also handing diagnostics to `sink`.
    pub fn evaluate_with_diagnostics(
        &self,
        reference: &Raster,
        test: &Raster,
        reference_mask: &Mask,
        test_mask: &Mask,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Evaluation> {
        self.run(reference, test, reference_mask, test_mask, Some(sink))
    }

    fn run(
        &self,
        reference: &Raster,
        test: &Raster,
        reference_mask: &Mask,
        test_mask: &Mask,
        mut sink: Option<&mut dyn DiagnosticSink>,
    ) -> Result<Evaluation> {
        let clip_limit = self.config.clip_limit;
        if !clip_limit.is_finite() || clip_limit < 0.0 {
            return Err(Error::InvalidClipLimit { value: clip_limit });
        }

        let shape = Shape::of(reference);
        ensure_same_shape("reference raster vs test raster", shape, Shape::of(test))?;
        ensure_same_shape("reference raster vs reference mask", shape, Shape::of(reference_mask))?;
        ensure_same_shape("test raster vs test mask", shape, Shape::of(test_mask))?;
        debug!("evaluating {} grid", shape);

        let mut warnings = Vec::new();

        let overlap = intersect_masks(reference_mask, test_mask)?;
        let vertical = vertical_error(reference, test, &overlap, self.config.denominator)?;
        if vertical.is_degenerate() {
            if self.config.strict_overlap {
                return Err(Error::DegenerateOverlap {
                    cells: vertical.grid_cells,
                });
            }
            let warning = Warning::DegenerateOverlap {
                cells: vertical.grid_cells,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        if sink.is_some() {
            let error_map = vertical.error_map();
            diagnostics::emit(
                &mut sink,
                Plot {
                    name: diagnostics::HEIGHT_ERROR,
                    title: "Terrain Model - Height Error",
                    figure: Some(581),
                    colorbar: true,
                    data: PlotData::Grid(&error_map),
                },
            )?;
            let clipped = vertical.clipped_error_map(clip_limit);
            diagnostics::emit(
                &mut sink,
                Plot {
                    name: diagnostics::HEIGHT_ERROR_CLIPPED,
                    title: "Terrain Model - Height Error",
                    figure: Some(582),
                    colorbar: true,
                    data: PlotData::Grid(&clipped),
                },
            )?;
        }

        let reference_edge_mask = edge_mask_with(reference_mask, self.config.boundary);
        let test_edge_mask = edge_mask_with(test_mask, self.config.boundary);
        let reference_edges = mask_points(&reference_edge_mask);
        let test_edges = mask_points(&test_edge_mask);
        debug!(
            "boundary points: {} reference, {} test",
            reference_edges.len(),
            test_edges.len()
        );

        let gap = if reference_edges.is_empty() {
            Some(Warning::EmptyReferenceBoundary)
        } else if test_edges.is_empty() {
            Some(Warning::EmptyTestBoundary)
        } else {
            None
        };

        let (matches, hrmse) = match gap {
            Some(warning) if !self.config.require_boundary => {
                warn!("{}", warning);
                warnings.push(warning);
                (Vec::new(), None)
            }
            _ => {
                let matches = match_nearest::<RTreeIndex>(&reference_edges, &test_edges)?;
                let hrmse = horizontal_rmse(&match_distances(&matches))?;
                debug!("horizontal rmse {:.4} over {} matches", hrmse, matches.len());
                (matches, Some(hrmse))
            }
        };

        if sink.is_some() {
            diagnostics::emit(
                &mut sink,
                Plot {
                    name: diagnostics::REFERENCE_EDGES,
                    title: "Reference Model Perimeters",
                    figure: Some(591),
                    colorbar: false,
                    data: PlotData::Mask(&reference_edge_mask),
                },
            )?;
            diagnostics::emit(
                &mut sink,
                Plot {
                    name: diagnostics::TEST_EDGES,
                    title: "Test Model Perimeters",
                    figure: Some(592),
                    colorbar: false,
                    data: PlotData::Mask(&test_edge_mask),
                },
            )?;
            diagnostics::emit(
                &mut sink,
                Plot {
                    name: diagnostics::NEAREST_POINTS,
                    title: "Relative Horizontal Accuracy",
                    figure: None,
                    colorbar: false,
                    data: PlotData::Matches {
                        reference: &reference_edges,
                        test: &test_edges,
                        matches: &matches,
                    },
                },
            )?;
        }

        Ok(Evaluation {
            metrics: MetricsResult::new(vertical.rmse, hrmse),
            vertical,
            reference_edges,
            test_edges,
            matches,
            warnings,
        })
    }
}

/// Compare two surface models with the default configuration.
///
/// Shorthand for [`EvalSession::evaluate`] returning only the metrics.
pub fn evaluate(
    reference: &Raster,
    test: &Raster,
    reference_mask: &Mask,
    test_mask: &Mask,
) -> Result<MetricsResult> {
    EvalSession::default()
        .evaluate(reference, test, reference_mask, test_mask)
        .map(|evaluation| evaluation.metrics())
}
