//! Relative accuracy metrics between a reference and a test surface model.
//!
//! Two scalars are produced:
//!
//! - **Vertical RMSE**: root mean square of `test - reference` elevation over
//!   the cells both models define ([`vertical`]).
//! - **Horizontal RMSE**: root mean square of the distances from each
//!   reference footprint boundary cell to the nearest test boundary cell
//!   ([`horizontal`]).
//!
//! ## Denominator
//!
//! | Policy | N | All-invalid overlap |
//! |--------|---|---------------------|
//! | [`Denominator::GridCells`] | every cell of the grid | RMSE 0, flagged |
//! | [`Denominator::ValidCells`] | overlap cells only | error |
//!
//! `GridCells` is the default for compatibility with published results.
//! It deflates the RMSE when the overlap is sparse, since masked cells add
//! zero error but still count in `N`.

pub mod horizontal;
pub mod vertical;

pub use horizontal::horizontal_rmse;
pub use vertical::{VerticalError, vertical_error};

use serde::{Deserialize, Serialize};

/// Which cell count divides the sum of squared vertical errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Total number of grid cells, overlap or not.
    #[default]
    GridCells,
    /// Number of cells inside the overlap mask.
    ValidCells,
}

impl Denominator {
    /// Short code used in CSV output and on the command line.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::GridCells => "grid",
            Self::ValidCells => "valid",
        }
    }
}

impl std::fmt::Display for Denominator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridCells => write!(f, "grid cells"),
            Self::ValidCells => write!(f, "valid cells"),
        }
    }
}

impl std::str::FromStr for Denominator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grid" | "grid_cells" | "total" => Ok(Self::GridCells),
            "valid" | "valid_cells" | "overlap" => Ok(Self::ValidCells),
            other => Err(format!("unknown denominator '{other}' (expected grid or valid)")),
        }
    }
}

/// The two accuracy scalars.
///
/// The horizontal value is absent when either footprint has no boundary
/// cells, which is the case for masks valid across the whole grid under
/// symmetric boundary handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    vertical_rmse: f64,
    horizontal_rmse: Option<f64>,
}

impl MetricsResult {
    /// Assemble a result from its two components.
    #[must_use]
    pub fn new(vertical_rmse: f64, horizontal_rmse: Option<f64>) -> Self {
        Self {
            vertical_rmse,
            horizontal_rmse,
        }
    }

    /// Vertical RMSE in elevation units.
    #[must_use]
    pub fn vertical_rmse(&self) -> f64 {
        self.vertical_rmse
    }

    /// Horizontal RMSE in grid cells, if both footprints have a boundary.
    #[must_use]
    pub fn horizontal_rmse(&self) -> Option<f64> {
        self.horizontal_rmse
    }
}

impl std::fmt::Display for MetricsResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zrmse={:.4}", self.vertical_rmse)?;
        match self.horizontal_rmse {
            Some(h) => write!(f, " hrmse={:.4}", h),
            None => write!(f, " hrmse=n/a"),
        }
    }
}
